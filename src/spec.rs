use {
    crate::{
        parse::grammar::{self, Grammar, GrammarBuilder},
        source::{LineSource, SourceError},
        util::string_utils::{at_line_end, next_word},
    },
    std::{collections::HashSet, error, fmt},
};

pub static POSSIBLE_TERMINALS: &str = "0123456789()[]{}abcdefghijklmnopqrstuvwxyz+-=/*";
pub static RULE_ARROW: &str = "->";
pub const MIN_NON_TERMINAL: char = 'A';
pub const MAX_NON_TERMINAL: char = 'Z';

lazy_static! {
    static ref TERMINAL_VOCABULARY: HashSet<char> = POSSIBLE_TERMINALS.chars().collect();
}

/// Reads a grammar description from `source`.
///
/// The description is, line by line: the non-terminal, terminal and rule counts; the
/// non-terminal alphabet; the terminal alphabet; one `X -> body` line per rule; and the start
/// symbol. Every symbol is a single character.
pub fn parse_spec(source: &mut dyn LineSource) -> Result<Grammar<char>, ParseError> {
    source.open()?;
    let res = parse_lines(source);
    source.close();
    res
}

fn parse_lines(source: &mut dyn LineSource) -> Result<Grammar<char>, ParseError> {
    let line = source.next_line()?;
    let mut cursor = 0;
    let non_terminal_count = read_count(&line, &mut cursor)?;
    let terminal_count = read_count(&line, &mut cursor)?;
    let rule_count = read_count(&line, &mut cursor)?;

    let non_terminals = read_non_terminals(non_terminal_count, source)?;
    let terminals = read_terminals(terminal_count, source)?;

    let mut builder: GrammarBuilder<char> = GrammarBuilder::new();
    for &non_terminal in &non_terminals {
        builder.non_terminal(non_terminal);
    }
    for &terminal in &terminals {
        builder.terminal(terminal);
    }

    for rule in 1..=rule_count {
        let (lhs, rhs) = match source.next_line() {
            Ok(line) => parse_rule(&line, &non_terminals, &terminals),
            Err(err) => Err(err.to_string()),
        }
        .map_err(|reason| ParseError::RuleErr(rule, reason))?;

        builder.add_production(&lhs, &rhs);
    }

    let start = read_start(&non_terminals, source)?;
    builder.mark_start(&start);

    debug!(
        "Read grammar with {} non-terminals, {} terminals and {} rules",
        non_terminals.len(),
        terminals.len(),
        rule_count
    );

    Ok(builder.build()?)
}

fn read_count(line: &str, cursor: &mut usize) -> Result<usize, ParseError> {
    match next_word(line, cursor) {
        None => Err(ParseError::FormatErr(format!("Missing count in '{}'", line))),
        Some(word) => word
            .parse::<usize>()
            .map_err(|_| ParseError::FormatErr(format!("Invalid count '{}'", word))),
    }
}

/// Reads a line holding exactly one word.
fn read_single_word(source: &mut dyn LineSource) -> Result<String, ParseError> {
    let line = source.next_line()?;
    let mut cursor = 0;

    let word = match next_word(&line, &mut cursor) {
        None => return Err(ParseError::FormatErr("Missing word on line".to_string())),
        Some(word) => word.to_string(),
    };

    if !at_line_end(&line, cursor) {
        return Err(ParseError::FormatErr(format!(
            "Unexpected input after '{}'",
            word
        )));
    }

    Ok(word)
}

fn read_non_terminals(
    expected: usize,
    source: &mut dyn LineSource,
) -> Result<Vec<char>, ParseError> {
    let alphabet = read_single_word(source)?;

    let mut non_terminals: Vec<char> = Vec::new();
    for c in alphabet.chars() {
        if c < MIN_NON_TERMINAL || c > MAX_NON_TERMINAL {
            return Err(ParseError::NonTerminalErr(c));
        }
        if !non_terminals.contains(&c) {
            non_terminals.push(c);
        }
    }

    if non_terminals.len() != expected {
        return Err(ParseError::SizeErr {
            alphabet: "non-terminal",
            expected,
            actual: non_terminals.len(),
        });
    }

    Ok(non_terminals)
}

fn read_terminals(expected: usize, source: &mut dyn LineSource) -> Result<Vec<char>, ParseError> {
    let alphabet = read_single_word(source)?;

    let mut terminals: Vec<char> = Vec::new();
    for c in alphabet.chars() {
        if !TERMINAL_VOCABULARY.contains(&c) {
            return Err(ParseError::TerminalErr(c));
        }
        if !terminals.contains(&c) {
            terminals.push(c);
        }
    }

    if terminals.len() != expected {
        return Err(ParseError::SizeErr {
            alphabet: "terminal",
            expected,
            actual: terminals.len(),
        });
    }

    Ok(terminals)
}

fn parse_rule(
    line: &str,
    non_terminals: &[char],
    terminals: &[char],
) -> Result<(char, Vec<char>), String> {
    let mut cursor = 0;

    let lhs = match next_word(line, &mut cursor) {
        None => return Err("empty rule".to_string()),
        Some(word) => single_char(word)
            .filter(|c| non_terminals.contains(c))
            .ok_or_else(|| format!("'{}' is not a declared non-terminal", word))?,
    };

    match next_word(line, &mut cursor) {
        Some(arrow) if arrow == RULE_ARROW => {}
        Some(other) => return Err(format!("expected '{}' but found '{}'", RULE_ARROW, other)),
        None => return Err(format!("missing '{}'", RULE_ARROW)),
    }

    let rhs: Vec<char> = match next_word(line, &mut cursor) {
        None => Vec::new(),
        Some(body) => body.chars().collect(),
    };

    if !at_line_end(line, cursor) {
        return Err("unexpected input after rule body".to_string());
    }

    for c in &rhs {
        if !non_terminals.contains(c) && !terminals.contains(c) {
            return Err(format!("'{}' is not a declared symbol", c));
        }
    }

    Ok((lhs, rhs))
}

fn read_start(non_terminals: &[char], source: &mut dyn LineSource) -> Result<char, ParseError> {
    let word = read_single_word(source)?;
    match single_char(&word) {
        Some(c) if non_terminals.contains(&c) => Ok(c),
        _ => Err(ParseError::StartErr(word)),
    }
}

fn single_char(word: &str) -> Option<char> {
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ParseError {
    FormatErr(String),
    NonTerminalErr(char),
    TerminalErr(char),
    SizeErr {
        alphabet: &'static str,
        expected: usize,
        actual: usize,
    },
    RuleErr(usize, String),
    StartErr(String),
    SourceErr(SourceError),
    GrammarErr(grammar::BuildError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::FormatErr(ref err) => {
                write!(f, "inappropriate parsing format: {}", err)
            }
            ParseError::NonTerminalErr(c) => {
                write!(f, "inappropriate nonterminal value '{}'", c)
            }
            ParseError::TerminalErr(c) => write!(f, "inappropriate terminal value '{}'", c),
            ParseError::SizeErr {
                alphabet,
                expected,
                actual,
            } => write!(
                f,
                "expected size does not match real size: {} {} symbols declared, {} found",
                expected, alphabet, actual
            ),
            ParseError::RuleErr(rule, ref reason) => {
                write!(f, "rule number {} is wrong: {}", rule, reason)
            }
            ParseError::StartErr(ref word) => {
                write!(f, "inappropriate start nonterminal '{}'", word)
            }
            ParseError::SourceErr(ref err) => write!(f, "Failed to read grammar: {}", err),
            ParseError::GrammarErr(ref err) => write!(f, "Invalid grammar: {}", err),
        }
    }
}

impl error::Error for ParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            ParseError::SourceErr(ref err) => Some(err),
            ParseError::GrammarErr(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<SourceError> for ParseError {
    fn from(err: SourceError) -> ParseError {
        ParseError::SourceErr(err)
    }
}

impl From<grammar::BuildError> for ParseError {
    fn from(err: grammar::BuildError) -> ParseError {
        ParseError::GrammarErr(err)
    }
}
