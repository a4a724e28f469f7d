#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

use {
    crate::{
        parse::{grammar::Grammar, Recognizer, Verdict},
        source::{LineSource, SourceError},
    },
    std::{error, fmt, io},
};

pub mod parse;
pub mod source;
pub mod spec;
mod util;

/// Answers membership queries against a grammar read from a grammar description.
pub struct QueryRunner {
    grammar: Grammar<char>,
    recognizer: Box<dyn Recognizer<char>>,
}

impl QueryRunner {
    pub fn build(source: &mut dyn LineSource) -> Result<QueryRunner, BuildError> {
        let grammar = spec::parse_spec(source)?;
        Ok(QueryRunner::from_grammar(grammar))
    }

    pub fn from_grammar(grammar: Grammar<char>) -> QueryRunner {
        QueryRunner {
            grammar,
            recognizer: parse::def_recognizer(),
        }
    }

    pub fn grammar(&self) -> &Grammar<char> {
        &self.grammar
    }

    pub fn check(&self, word: &str) -> Verdict {
        let word: Vec<char> = word.chars().collect();
        self.recognizer.check(&word, &self.grammar)
    }

    pub fn accepts(&self, word: &str) -> bool {
        self.check(word) == Verdict::Accepted
    }

    /// Reads a query count followed by that many words from `queries`, writing `YES` or `NO`
    /// to `out` for each word.
    pub fn run(
        &self,
        queries: &mut dyn LineSource,
        out: &mut dyn io::Write,
    ) -> Result<QueryMetrics, QueryError> {
        queries.open()?;
        let res = self.run_open(queries, out);
        queries.close();
        res
    }

    fn run_open(
        &self,
        queries: &mut dyn LineSource,
        out: &mut dyn io::Write,
    ) -> Result<QueryMetrics, QueryError> {
        let count_line = queries.next_line()?;
        let count = match count_line.trim().parse::<usize>() {
            Ok(count) => count,
            Err(_) => return Err(QueryError::CountErr(count_line)),
        };

        let mut metrics = QueryMetrics::new();
        for _ in 0..count {
            let line = queries.next_line()?;
            let word = line.trim();

            let verdict = self.check(word);
            metrics.record(verdict);

            match verdict {
                Verdict::Accepted => writeln!(out, "YES")?,
                Verdict::Rejected => writeln!(out, "NO")?,
                Verdict::Malformed { position } => {
                    debug!("Query '{}' has a non-terminal at {}", word, position);
                    writeln!(out, "NO")?
                }
            }
        }

        out.flush()?;
        Ok(metrics)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMetrics {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub malformed: usize,
}

impl QueryMetrics {
    fn new() -> Self {
        QueryMetrics {
            total: 0,
            accepted: 0,
            rejected: 0,
            malformed: 0,
        }
    }

    fn record(&mut self, verdict: Verdict) {
        self.total += 1;
        match verdict {
            Verdict::Accepted => self.accepted += 1,
            Verdict::Rejected => self.rejected += 1,
            Verdict::Malformed { .. } => self.malformed += 1,
        }
    }
}

#[derive(Debug)]
pub enum BuildError {
    SpecParseErr(spec::ParseError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BuildError::SpecParseErr(ref err) => {
                write!(f, "Failed to parse grammar specification: {}", err)
            }
        }
    }
}

impl error::Error for BuildError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            BuildError::SpecParseErr(ref err) => Some(err),
        }
    }
}

impl From<spec::ParseError> for BuildError {
    fn from(err: spec::ParseError) -> BuildError {
        BuildError::SpecParseErr(err)
    }
}

#[derive(Debug)]
pub enum QueryError {
    SourceErr(SourceError),
    CountErr(String),
    IOErr(io::Error),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            QueryError::SourceErr(ref err) => write!(f, "Failed to read query: {}", err),
            QueryError::CountErr(ref line) => write!(f, "Invalid query count '{}'", line),
            QueryError::IOErr(ref err) => write!(f, "Failed to write answer: {}", err),
        }
    }
}

impl error::Error for QueryError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            QueryError::SourceErr(ref err) => Some(err),
            QueryError::CountErr(_) => None,
            QueryError::IOErr(ref err) => Some(err),
        }
    }
}

impl From<SourceError> for QueryError {
    fn from(err: SourceError) -> QueryError {
        QueryError::SourceErr(err)
    }
}

impl From<io::Error> for QueryError {
    fn from(err: io::Error) -> QueryError {
        QueryError::IOErr(err)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::source::StrSource,
        std::error::Error,
    };

    static ANBN: &str = "1 2 2
S
ab
S -> aSb
S ->
S
";

    fn runner() -> QueryRunner {
        QueryRunner::build(&mut StrSource::new(ANBN)).unwrap()
    }

    #[test]
    fn run_queries() {
        //setup
        let qr = runner();
        let mut queries = StrSource::new("6\n\nab\naabb\naab\nba\nabc\n");
        let mut out: Vec<u8> = Vec::new();

        //exercise
        let metrics = qr.run(&mut queries, &mut out).unwrap();

        //verify
        assert_eq!(String::from_utf8(out).unwrap(), "YES\nYES\nYES\nNO\nNO\nNO\n");
        assert_eq!(
            metrics,
            QueryMetrics {
                total: 6,
                accepted: 3,
                rejected: 2,
                malformed: 1,
            }
        );
    }

    #[test]
    fn run_invalid_count() {
        //setup
        let qr = runner();
        let mut queries = StrSource::new("many\nab\n");
        let mut out: Vec<u8> = Vec::new();

        //exercise
        let res = qr.run(&mut queries, &mut out);

        //verify
        assert_eq!(
            format!("{}", res.err().unwrap()),
            "Invalid query count 'many'"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn run_missing_queries() {
        //setup
        let qr = runner();
        let mut queries = StrSource::new("3\nab\n");
        let mut out: Vec<u8> = Vec::new();

        //exercise
        let res = qr.run(&mut queries, &mut out);

        //verify
        let err: &dyn Error = &res.err().unwrap();
        assert_eq!(format!("{}", err), "Failed to read query: end of file reached");
        assert_eq!(format!("{}", err.source().unwrap()), "end of file reached");
        assert_eq!(String::from_utf8(out).unwrap(), "YES\n");
    }

    #[test]
    fn check_distinguishes_malformed() {
        //setup
        let qr = runner();

        //exercise
        let rejected = qr.check("ba");
        let malformed = qr.check("aXb");

        //verify
        assert_eq!(rejected, Verdict::Rejected);
        assert_eq!(malformed, Verdict::Malformed { position: 1 });
        assert!(!qr.accepts("aXb"));
        assert!(qr.accepts("aaabbb"));
    }

    #[test]
    fn failed_parse_spec() {
        //setup
        let spec = "1 2 1
S
ab
S = aSb
S
";

        //exercise
        let res = QueryRunner::build(&mut StrSource::new(spec));

        //verify
        let mut err: &dyn Error = &res.err().unwrap();
        assert_eq!(
            format!("{}", err),
            "Failed to parse grammar specification: rule number 1 is wrong: \
             expected '->' but found '='"
        );

        err = err.source().unwrap();
        assert_eq!(
            format!("{}", err),
            "rule number 1 is wrong: expected '->' but found '='"
        );

        assert!(err.source().is_none());
    }
}
