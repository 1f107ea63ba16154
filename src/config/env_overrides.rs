use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("POSTWRIGHT_API_KEY").or_else(|_| std::env::var("API_KEY"))
            && !key.is_empty()
        {
            self.llm.api_key = Some(key);
        }

        if let Ok(provider) = std::env::var("POSTWRIGHT_PROVIDER")
            && !provider.is_empty()
        {
            self.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("POSTWRIGHT_MODEL")
            && !model.is_empty()
        {
            self.llm.model = model;
        }

        if let Ok(base_url) = std::env::var("POSTWRIGHT_BASE_URL")
            && !base_url.is_empty()
        {
            self.llm.base_url = Some(base_url);
        }

        if let Ok(temp_str) = std::env::var("POSTWRIGHT_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.llm.temperature = temp;
        }

        if let Ok(secs) = std::env::var("POSTWRIGHT_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
            && secs > 0
        {
            self.llm.timeout_secs = secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_env::{ENV_LOCK, EnvVarGuard};
    use super::*;

    #[test]
    fn env_overrides_llm_settings() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let _key = EnvVarGuard::set("POSTWRIGHT_API_KEY", "sk-test");
        let _provider = EnvVarGuard::set("POSTWRIGHT_PROVIDER", "gemini");
        let _model = EnvVarGuard::set("POSTWRIGHT_MODEL", "gemini-2.5-pro");
        let _temp = EnvVarGuard::set("POSTWRIGHT_TEMPERATURE", "0.2");
        let _timeout = EnvVarGuard::set("POSTWRIGHT_TIMEOUT_SECS", "45");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert!((config.llm.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.llm.timeout_secs, 45);
    }

    #[test]
    fn out_of_range_temperature_is_ignored() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let _temp = EnvVarGuard::set("POSTWRIGHT_TEMPERATURE", "7");
        let _timeout = EnvVarGuard::set("POSTWRIGHT_TIMEOUT_SECS", "0");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert!((config.llm.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.llm.timeout_secs, 120);
    }

    #[test]
    fn generic_api_key_is_a_fallback() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let _specific = EnvVarGuard::unset("POSTWRIGHT_API_KEY");
        let _generic = EnvVarGuard::set("API_KEY", "generic-key");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.llm.api_key.as_deref(), Some("generic-key"));
    }
}
