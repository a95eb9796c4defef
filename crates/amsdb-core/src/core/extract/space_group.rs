use regex::Regex;
use tracing::debug;

const SPACE_GROUP_BODY: &str = r"(\w+?\S\w+)";

/// Reads the international space-group symbol out of a job name.
///
/// Job names follow `<prefix>-<compound>_<space group>_<energy>_<supercell>`,
/// e.g. `GO-1.0-2-LiF_Pm-3m_-2.89_2x1x1`. Screw axes use an underscore
/// (`P6_3mc`), so the symbol itself may contain the field separator. The
/// symbol is searched with three patterns, first match wins:
///
/// 1. `<compound>_<symbol>_-<digit>` (negative energy field),
/// 2. `<first fragment>_<symbol>_<digit>` with an optional minus sign,
/// 3. `<second fragment>_<symbol>_<digit>` with an optional minus sign.
///
/// The fragments cover names written for one species of the compound.
#[derive(Debug, Clone)]
pub struct SpaceGroupParser {
    patterns: [Regex; 3],
}

impl SpaceGroupParser {
    pub fn new(compound: &str, fragments: [&str; 2]) -> Self {
        let build = |label: &str, energy: &str| {
            let pattern = format!(
                "{}_{}_{}",
                regex::escape(label),
                SPACE_GROUP_BODY,
                energy
            );
            Regex::new(&pattern).expect("escaped label yields a valid pattern")
        };
        Self {
            patterns: [
                build(compound, r"-\d"),
                build(fragments[0], r"-?\d"),
                build(fragments[1], r"-?\d"),
            ],
        }
    }

    pub fn parse(&self, job_name: &str) -> Option<String> {
        for (i, pattern) in self.patterns.iter().enumerate() {
            if let Some(symbol) = pattern.captures(job_name).and_then(|c| c.get(1)) {
                debug!(
                    "Space group '{}' found in '{}' with pattern {}",
                    symbol.as_str(),
                    job_name,
                    i + 1
                );
                return Some(symbol.as_str().to_string());
            }
        }
        debug!("No space group found in '{}'", job_name);
        None
    }
}

impl Default for SpaceGroupParser {
    fn default() -> Self {
        Self::new("LiF", ["F", "Li"])
    }
}
