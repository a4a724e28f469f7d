use {
    colored::{ColoredString, Colorize},
    log::{LevelFilter, Record},
    log4rs::{
        append::file::FileAppender,
        config::{Appender, Config, Root},
        encode::{pattern::PatternEncoder, Encode, Write as LogWrite},
        Handle,
    },
    std::{
        error::Error,
        fmt,
        io::{self, Cursor, Read, Seek, SeekFrom, Write},
        panic,
        sync::Mutex,
    },
};

static DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

lazy_static! {
    static ref PREFIX_ERR: ColoredString = "error".bright_red();
    static ref PREFIX_FATAL: ColoredString = "fatal".on_bright_red();
    static ref LOGGER_HANDLE: Mutex<Option<Handle>> = Mutex::new(None);
}

/// Runs `$body`, running `$catch` instead of unwinding further if it raised a `Fatal`.
macro_rules! catch_fatal {
    ($body: block, $catch: block) => {
        std::panic::set_hook(Box::new(|info| {
            if !info.payload().is::<crate::cli::logger::Fatal>() {
                use backtrace::Backtrace;
                let backtrace = Backtrace::new();

                eprintln!("{}", info);
                error!("{}", info);
                eprintln!("{:?}", backtrace);
                error!("{:?}", backtrace);
            }
        }));

        if let Err(err) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            if err.is::<crate::cli::logger::Fatal>() {
                $catch

                #[allow(unreachable_code)]
                {
                    let _ = std::panic::take_hook();
                }
            } else {
                std::panic::resume_unwind(err)
            }
        }
    };
}

#[derive(Debug)]
pub enum Fatal {
    Error,
}

impl fmt::Display for Fatal {
    fn fmt(&self, _: &mut fmt::Formatter) -> fmt::Result {
        Ok(())
    }
}

impl Error for Fatal {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

pub fn init(log_file: Option<&str>, log_level: Option<&str>) {
    if let Some(log_file) = log_file {
        let log_level = match log_level {
            Some("error") => LevelFilter::Error,
            Some("warn") => LevelFilter::Warn,
            Some("info") => LevelFilter::Info,
            Some("debug") => LevelFilter::Debug,
            Some("trace") => LevelFilter::Trace,
            Some(other) => {
                err(&format!(
                    "Invalid log level: '{}'. Falling back to {}",
                    other, DEFAULT_LOG_LEVEL
                ));
                DEFAULT_LOG_LEVEL
            }
            None => DEFAULT_LOG_LEVEL,
        };

        let pattern_encoder = PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {l} - {m}{n}");
        let sanitized_encoder = SanitizedEncoder::wrap(pattern_encoder);

        let file_appender = match FileAppender::builder()
            .encoder(Box::new(sanitized_encoder))
            .build(log_file)
        {
            Ok(file_appender) => file_appender,
            Err(err) => fatal(&format!("Failed to build log file appender: {}", err)),
        };

        let config = match Config::builder()
            .appender(Appender::builder().build("file", Box::new(file_appender)))
            .build(Root::builder().appender("file").build(log_level))
        {
            Ok(config) => config,
            Err(err) => fatal(&format!("Failed to build logger configuration: {}", err)),
        };

        let mut handle_opt = match LOGGER_HANDLE.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if handle_opt.is_none() {
            match log4rs::init_config(config) {
                Ok(handle) => {
                    *handle_opt = Some(handle);
                }
                Err(err) => fatal(&format!("Failed to initialize logger: {}", err)),
            }
        } else if let Some(ref handle) = *handle_opt {
            handle.set_config(config);
        }
    }

    info!("Starting kart {}", env!("CARGO_PKG_VERSION"));
}

pub fn info(string: &str) {
    eprintln!("{}", string);
    info!("{}", string);
}

pub fn err(string: &str) {
    eprintln!("{}: {}", *PREFIX_ERR, string);
    error!("{}", string);
}

pub fn fatal(string: &str) -> ! {
    eprintln!("{}: {}", *PREFIX_FATAL, string);
    error!("{}", string);
    panic::panic_any(Fatal::Error);
}

/// Strips terminal colour codes from everything the wrapped encoder writes.
#[derive(Debug)]
struct SanitizedEncoder {
    encoder: Box<dyn Encode>,
}

impl SanitizedEncoder {
    fn wrap(encoder: impl Encode) -> Self {
        SanitizedEncoder {
            encoder: Box::new(encoder),
        }
    }
}

impl Encode for SanitizedEncoder {
    fn encode(
        &self,
        w: &mut dyn LogWrite,
        record: &Record,
    ) -> Result<(), Box<dyn Error + Sync + Send>> {
        let mut writer = SanitizedLogWriter::new();
        self.encoder.encode(&mut writer, record)?;
        writer.sanitize_write(w)?;
        Ok(())
    }
}

struct SanitizedLogWriter {
    cursor: Cursor<Vec<u8>>,
}

impl SanitizedLogWriter {
    fn new() -> Self {
        SanitizedLogWriter {
            cursor: Cursor::new(Vec::new()),
        }
    }

    fn sanitize_write(&mut self, w: &mut dyn LogWrite) -> Result<(), io::Error> {
        let mut buf = Vec::new();
        self.cursor.seek(SeekFrom::Start(0))?;
        self.cursor.read_to_end(&mut buf)?;

        let sanitized = strip_ansi_escapes::strip(buf)?;
        w.write_all(&sanitized)
    }
}

impl Write for SanitizedLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.cursor.flush()
    }
}

impl LogWrite for SanitizedLogWriter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_writer_strips_colours() {
        //setup
        let mut writer = SanitizedLogWriter::new();
        let mut sink = SanitizedLogWriter::new();
        write!(writer, "{}: bad rule", "error".bright_red()).unwrap();

        //exercise
        writer.sanitize_write(&mut sink).unwrap();

        //verify
        assert_eq!(
            String::from_utf8(sink.cursor.into_inner()).unwrap(),
            "error: bad rule"
        );
    }
}
