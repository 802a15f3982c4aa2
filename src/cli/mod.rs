use clap::Parser;

use padbridge::config::Config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,
    /// Log level, overrides the LOG_LEVEL environment variable
    #[arg(short, long)]
    pub log_level: Option<String>,
    /// Watch device directories and connect controllers as they appear
    #[arg(long)]
    pub hotplug: bool,
    /// Do not forward rumble to the physical controller
    #[arg(long)]
    pub no_rumble: bool,
}

impl Args {
    /// Apply the command line overrides to the given configuration
    pub fn apply(&self, config: &mut Config) {
        if self.hotplug {
            config.hotplug = true;
        }
        if self.no_rumble {
            config.rumble = false;
        }
    }
}
