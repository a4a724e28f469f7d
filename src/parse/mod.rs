use crate::parse::grammar::{Grammar, GrammarSymbol};

mod earley;
pub mod grammar;

/// Decides membership of words in the language of a grammar.
pub trait Recognizer<S: GrammarSymbol>: Send + Sync {
    fn check(&self, word: &[S], grammar: &Grammar<S>) -> Verdict;

    fn recognize(&self, word: &[S], grammar: &Grammar<S>) -> bool {
        self.check(word, grammar) == Verdict::Accepted
    }
}

pub fn def_recognizer<S: GrammarSymbol>() -> Box<dyn Recognizer<S>> {
    Box::new(earley::EarleyRecognizer)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
    /// The word contains a symbol that is not a terminal of the grammar.
    Malformed { position: usize },
}
