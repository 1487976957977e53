//! In-memory project fixture for unit tests

use crate::tools::ProjectInspector;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct FakeProject {
    files: HashMap<String, String>,
    dirs: HashSet<String>,
    pub expo_cli: bool,
    pub expo_config: Option<String>,
    pub expo_cli_calls: Cell<usize>,
    pub expo_config_calls: Cell<usize>,
}

impl FakeProject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, contents: &str) -> Self {
        self.files.insert(name.to_string(), contents.to_string());
        self
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.dirs.insert(name.to_string());
        self
    }

    pub fn with_expo_cli(mut self) -> Self {
        self.expo_cli = true;
        self
    }

    pub fn with_expo_config(mut self, json: &str) -> Self {
        self.expo_config = Some(json.to_string());
        self
    }
}

impl ProjectInspector for FakeProject {
    fn read_file(&self, name: &str) -> Option<String> {
        self.files.get(name).cloned()
    }

    fn exists(&self, name: &str) -> bool {
        self.files.contains_key(name) || self.dirs.contains(name)
    }

    fn expo_cli_works(&self) -> bool {
        self.expo_cli_calls.set(self.expo_cli_calls.get() + 1);
        self.expo_cli
    }

    fn expo_config_json(&self) -> Option<String> {
        self.expo_config_calls.set(self.expo_config_calls.get() + 1);
        self.expo_config.clone()
    }
}
