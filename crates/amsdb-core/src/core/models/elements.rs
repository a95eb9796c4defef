use phf::{Set, phf_set};

static ELEMENT_SYMBOLS: Set<&'static str> = phf_set! {
    "H", "He",
    "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar",
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr",
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe",
    "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy",
    "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt",
    "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn",
    "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf",
    "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
};

static NON_METALS: Set<&'static str> = phf_set! {
    "H", "He", "B", "C", "N", "O", "F", "Ne", "Si", "P", "S", "Cl", "Ar",
    "Ge", "As", "Se", "Br", "Kr", "Sb", "Te", "I", "Xe", "Po", "At", "Rn",
};

pub fn is_element(symbol: &str) -> bool {
    ELEMENT_SYMBOLS.contains(symbol)
}

pub fn is_metal(symbol: &str) -> bool {
    is_element(symbol) && !NON_METALS.contains(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_element_accepts_known_symbols_only() {
        assert!(is_element("Li"));
        assert!(is_element("F"));
        assert!(is_element("Og"));
        assert!(!is_element("li"));
        assert!(!is_element("Xx"));
        assert!(!is_element(""));
    }

    #[test]
    fn is_metal_separates_metals_from_non_metals() {
        assert!(is_metal("Li"));
        assert!(is_metal("Fe"));
        assert!(!is_metal("F"));
        assert!(!is_metal("O"));
        assert!(!is_metal("Xx"));
    }
}
