//! Create a default .tapr.conf

use crate::commands::utils::base_dir;
use crate::commands::Command;
use crate::config::{CONFIG_FILE, DEFAULT_CONFIG};
use crate::error::{Error, Result};
use crate::sink::Sink;
use std::fs;

pub struct InitCommand {
    base_path: Option<String>,
}

impl InitCommand {
    pub fn new(base_path: Option<String>) -> Self {
        InitCommand { base_path }
    }
}

impl Command for InitCommand {
    fn execute(&self, sink: &mut dyn Sink) -> Result<i32> {
        let path = base_dir(self.base_path.as_deref()).join(CONFIG_FILE);

        if path.exists() {
            return Err(Error::ConfigExists(path));
        }

        fs::write(&path, DEFAULT_CONFIG)?;
        sink.write(&format!("Created {}\n", path.display()))?;
        Ok(0)
    }
}
