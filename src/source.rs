use std::{
    error, fmt,
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

/// A line-oriented input, opened before the first read and closed after the last.
pub trait LineSource {
    fn open(&mut self) -> Result<(), SourceError>;

    /// Returns the next line without its line terminator.
    fn next_line(&mut self) -> Result<String, SourceError>;

    fn close(&mut self);
}

/// Reads lines from standard input.
pub struct ConsoleSource;

impl LineSource for ConsoleSource {
    fn open(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    fn next_line(&mut self) -> Result<String, SourceError> {
        let stdin = io::stdin();
        let mut handle = stdin.lock();
        read_line(&mut handle)
    }

    fn close(&mut self) {}
}

pub struct FileSource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
}

impl FileSource {
    pub fn new(path: &Path) -> Self {
        FileSource {
            path: PathBuf::from(path),
            reader: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for FileSource {
    fn open(&mut self) -> Result<(), SourceError> {
        let file = File::open(&self.path)?;
        self.reader = Some(BufReader::new(file));
        Ok(())
    }

    fn next_line(&mut self) -> Result<String, SourceError> {
        match self.reader {
            None => Err(SourceError::NotOpenErr),
            Some(ref mut reader) => read_line(reader),
        }
    }

    fn close(&mut self) {
        self.reader = None;
    }
}

/// Serves lines from an in-memory string.
pub struct StrSource {
    lines: Vec<String>,
    cursor: usize,
}

impl StrSource {
    pub fn new(text: &str) -> Self {
        StrSource {
            lines: text.lines().map(String::from).collect(),
            cursor: 0,
        }
    }
}

impl LineSource for StrSource {
    fn open(&mut self) -> Result<(), SourceError> {
        self.cursor = 0;
        Ok(())
    }

    fn next_line(&mut self) -> Result<String, SourceError> {
        match self.lines.get(self.cursor) {
            None => Err(SourceError::EndOfInput),
            Some(line) => {
                self.cursor += 1;
                Ok(line.clone())
            }
        }
    }

    fn close(&mut self) {}
}

fn read_line(reader: &mut dyn BufRead) -> Result<String, SourceError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(SourceError::EndOfInput);
    }

    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }

    Ok(line)
}

#[derive(Debug)]
pub enum SourceError {
    EndOfInput,
    NotOpenErr,
    IOErr(io::Error),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SourceError::EndOfInput => write!(f, "end of file reached"),
            SourceError::NotOpenErr => write!(f, "Source read before being opened"),
            SourceError::IOErr(ref err) => write!(f, "IO error: {}", err),
        }
    }
}

impl error::Error for SourceError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            SourceError::EndOfInput => None,
            SourceError::NotOpenErr => None,
            SourceError::IOErr(ref err) => Some(err),
        }
    }
}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> SourceError {
        SourceError::IOErr(err)
    }
}
