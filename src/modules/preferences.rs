use dashmap::DashMap;

/// Boolean preferences shared between the screen and its background tasks.
pub trait PreferenceStore: Send + Sync {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn set_bool(&self, key: &str, value: bool);
}

/// In-memory store. Safe to share across tasks behind an `Arc`.
#[derive(Default)]
pub struct MemoryPreferences {
    values: DashMap<String, bool>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).map(|v| *v)
    }

    fn set_bool(&self, key: &str, value: bool) {
        self.values.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_key_reads_none() {
        let prefs = MemoryPreferences::new();
        assert_eq!(prefs.get_bool("missing"), None);
        prefs.set_bool("missing", true);
        assert_eq!(prefs.get_bool("missing"), Some(true));
    }
}
