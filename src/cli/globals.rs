use std::path::PathBuf;

/// Arguments shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub data_dir: PathBuf,
}

impl GlobalArgs {
    /// Falls back to `<config dir>/relayctl` when no data directory is given.
    #[must_use]
    pub fn new(api_url: String, data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("relayctl")
        });

        Self { api_url, data_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "http://localhost:8080/api".to_string(),
            Some(PathBuf::from("/tmp/relayctl")),
        );
        assert_eq!(args.api_url, "http://localhost:8080/api");
        assert_eq!(args.data_dir, PathBuf::from("/tmp/relayctl"));
    }

    #[test]
    fn test_default_data_dir() {
        let args = GlobalArgs::new("http://localhost:8080/api".to_string(), None);
        assert!(args.data_dir.ends_with("relayctl"));
    }
}
