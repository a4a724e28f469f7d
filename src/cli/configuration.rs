use {
    serde::Deserialize,
    std::{error, fmt, fs, io, path::Path},
};

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    pub grammar: Option<String>,
    pub queries: Option<String>,
    pub log_file: Option<String>,
    pub log_level: Option<String>,
}

pub fn read_configuration(path: &Path) -> Result<Configuration, ConfigurationError> {
    let conf_str = fs::read_to_string(path)?;
    parse_configuration(&conf_str)
}

fn parse_configuration(conf_str: &str) -> Result<Configuration, ConfigurationError> {
    if conf_str.trim().is_empty() {
        return Ok(Configuration::default());
    }

    Ok(serde_yaml::from_str(conf_str)?)
}

#[derive(Debug)]
pub enum ConfigurationError {
    IOErr(io::Error),
    DeserializationErr(serde_yaml::Error),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConfigurationError::IOErr(ref err) => write!(f, "IO error: {}", err),
            ConfigurationError::DeserializationErr(ref err) => {
                write!(f, "Failed to parse configuration file: {}", err)
            }
        }
    }
}

impl error::Error for ConfigurationError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            ConfigurationError::IOErr(ref err) => Some(err),
            ConfigurationError::DeserializationErr(ref err) => Some(err),
        }
    }
}

impl From<io::Error> for ConfigurationError {
    fn from(err: io::Error) -> Self {
        ConfigurationError::IOErr(err)
    }
}

impl From<serde_yaml::Error> for ConfigurationError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigurationError::DeserializationErr(err)
    }
}
