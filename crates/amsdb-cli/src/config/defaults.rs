/// Built-in values used when neither the command line nor the config file sets them.
pub struct DefaultsConfig {
    pub add_initial_configuration: bool,
    pub use_runtime: bool,
    pub report: bool,
    pub compound: String,
    pub fragments: [String; 2],
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            add_initial_configuration: false,
            use_runtime: true,
            report: true,
            compound: "LiF".to_string(),
            fragments: ["F".to_string(), "Li".to_string()],
        }
    }
}
