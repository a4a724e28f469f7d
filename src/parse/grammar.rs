use {
    crate::util::encoder::Encoder,
    std::{
        collections::{HashMap, HashSet},
        error, fmt,
        hash::Hash,
        sync::Arc,
    },
};

/// Interned id of a grammar symbol.
pub type Symbol = usize;

pub trait GrammarSymbol: Eq + Hash + Clone + fmt::Debug + fmt::Display {}

impl GrammarSymbol for char {}

impl GrammarSymbol for String {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub lhs: Symbol,
    pub rhs: Arc<[Symbol]>,
}

impl Production {
    pub fn from(lhs: Symbol, rhs: Vec<Symbol>) -> Self {
        Production {
            lhs,
            rhs: Arc::from(rhs),
        }
    }

    pub fn epsilon(lhs: Symbol) -> Self {
        Production::from(lhs, Vec::new())
    }

    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

/// An immutable context-free grammar over author symbols of type `S`.
///
/// Every author symbol is interned to a `Symbol` id when the grammar is built. The grammar
/// also carries a synthetic augmented start symbol, which no author symbol encodes to, whose
/// only production derives the real start symbol.
pub struct Grammar<S: GrammarSymbol> {
    prods_by_lhs: HashMap<Symbol, Vec<Production>>,
    nss: HashSet<Symbol>,
    non_terminals: HashSet<Symbol>,
    terminals: HashSet<Symbol>,
    start: Symbol,
    augmented_start: Symbol,
    encoder: Encoder<S>,
}

impl<S: GrammarSymbol> Grammar<S> {
    pub fn classify(&self, symbol: &S) -> SymbolKind {
        match self.encoder.lookup(symbol) {
            None => SymbolKind::Undefined,
            Some(id) => self.kind(id),
        }
    }

    pub fn kind(&self, symbol: Symbol) -> SymbolKind {
        if self.non_terminals.contains(&symbol) {
            SymbolKind::NonTerminal
        } else if self.terminals.contains(&symbol) {
            SymbolKind::Terminal
        } else {
            SymbolKind::Undefined
        }
    }

    pub fn is_terminal(&self, symbol: Symbol) -> bool {
        self.terminals.contains(&symbol)
    }

    pub fn is_non_terminal(&self, symbol: Symbol) -> bool {
        self.non_terminals.contains(&symbol)
    }

    pub fn is_nullable(&self, symbol: Symbol) -> bool {
        self.nss.contains(&symbol)
    }

    pub fn start(&self) -> Symbol {
        self.start
    }

    pub fn augmented_start(&self) -> Symbol {
        self.augmented_start
    }

    pub fn terminals(&self) -> &HashSet<Symbol> {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &HashSet<Symbol> {
        &self.non_terminals
    }

    /// Returns the productions of `lhs`, which is empty for symbols without any.
    pub fn productions_for_lhs(&self, lhs: Symbol) -> &[Production] {
        self.prods_by_lhs
            .get(&lhs)
            .map(|prods| prods.as_slice())
            .unwrap_or(&[])
    }

    pub fn encode(&self, symbol: &S) -> Option<Symbol> {
        self.encoder.lookup(symbol)
    }

    pub fn decode(&self, symbol: Symbol) -> Option<&S> {
        self.encoder.decode(symbol)
    }

    pub fn symbol_string(&self, symbol: Symbol) -> String {
        if symbol == self.augmented_start {
            return format!("{}'", self.symbol_string(self.start));
        }

        match self.encoder.decode(symbol) {
            None => format!("#{}", symbol),
            Some(val) => val.to_string(),
        }
    }

    pub fn production_string(&self, production: &Production) -> String {
        let rhs: Vec<String> = production
            .rhs
            .iter()
            .map(|&sym| self.symbol_string(sym))
            .collect();
        format!("{} -> {}", self.symbol_string(production.lhs), rhs.join(" "))
    }
}

pub struct GrammarBuilder<S: GrammarSymbol> {
    encoder: Encoder<S>,
    terminals: HashSet<Symbol>,
    non_terminals: HashSet<Symbol>,
    productions: Vec<Production>,
    start: Option<Symbol>,
}

impl<S: GrammarSymbol> GrammarBuilder<S> {
    pub fn new() -> Self {
        GrammarBuilder {
            encoder: Encoder::new(),
            terminals: HashSet::new(),
            non_terminals: HashSet::new(),
            productions: Vec::new(),
            start: None,
        }
    }

    pub fn terminal(&mut self, symbol: S) -> &mut Self {
        let id = self.encoder.encode(&symbol);
        self.terminals.insert(id);
        self
    }

    pub fn non_terminal(&mut self, symbol: S) -> &mut Self {
        let id = self.encoder.encode(&symbol);
        self.non_terminals.insert(id);
        self
    }

    pub fn mark_start(&mut self, symbol: &S) -> &mut Self {
        self.start = Some(self.encoder.encode(symbol));
        self
    }

    pub fn add_production(&mut self, lhs: &S, rhs: &[S]) -> Production {
        let lhs = self.encoder.encode(lhs);
        let rhs = rhs.iter().map(|sym| self.encoder.encode(sym)).collect();

        let production = Production::from(lhs, rhs);
        self.productions.push(production.clone());
        production
    }

    pub fn from(&mut self, lhs: S) -> NonTerminalBuilder<S> {
        NonTerminalBuilder::new(self, lhs)
    }

    pub fn build(self) -> Result<Grammar<S>, BuildError> {
        let decode = |id: Symbol| match self.encoder.decode(id) {
            None => format!("#{}", id),
            Some(val) => val.to_string(),
        };

        let start = match self.start {
            None => return Err(BuildError::NoStartErr),
            Some(start) => start,
        };

        for id in 0..self.encoder.len() {
            if self.terminals.contains(&id) && self.non_terminals.contains(&id) {
                return Err(BuildError::AmbiguousKindErr(decode(id)));
            }
        }

        if !self.non_terminals.contains(&start) {
            return Err(BuildError::StartNotNonTerminalErr(decode(start)));
        }

        for prod in &self.productions {
            if !self.non_terminals.contains(&prod.lhs) {
                return Err(BuildError::LhsNotNonTerminalErr(decode(prod.lhs)));
            }
            for sym in prod.rhs.iter() {
                if !self.non_terminals.contains(sym) && !self.terminals.contains(sym) {
                    return Err(BuildError::UndefinedSymbolErr(decode(*sym)));
                }
            }
        }

        let augmented_start = self.encoder.len();
        let mut non_terminals = self.non_terminals;
        non_terminals.insert(augmented_start);

        let mut prods_by_lhs: HashMap<Symbol, Vec<Production>> = HashMap::new();
        for prod in self.productions {
            prods_by_lhs
                .entry(prod.lhs)
                .or_insert_with(Vec::new)
                .push(prod);
        }
        prods_by_lhs.insert(
            augmented_start,
            vec![Production::from(augmented_start, vec![start])],
        );

        let nss = build_nss(&prods_by_lhs);

        Ok(Grammar {
            prods_by_lhs,
            nss,
            non_terminals,
            terminals: self.terminals,
            start,
            augmented_start,
            encoder: self.encoder,
        })
    }
}

/// Computes the nullable non-terminals, i.e. those deriving the empty string.
fn build_nss(prods_by_lhs: &HashMap<Symbol, Vec<Production>>) -> HashSet<Symbol> {
    let mut nss: HashSet<Symbol> = HashSet::new();
    let mut prods_by_rhs: HashMap<Symbol, Vec<&Production>> = HashMap::new();
    let mut work_stack: Vec<Symbol> = Vec::new();

    prods_by_lhs
        .values()
        .flat_map(|prods| prods)
        .for_each(|prod| {
            for &sym in prod.rhs.iter() {
                prods_by_rhs.entry(sym).or_insert_with(Vec::new).push(prod);
            }

            if prod.is_epsilon() && nss.insert(prod.lhs) {
                work_stack.push(prod.lhs);
            }
        });

    while let Some(work_symbol) = work_stack.pop() {
        if let Some(prods) = prods_by_rhs.get(&work_symbol) {
            for prod in prods {
                if !nss.contains(&prod.lhs) && prod.rhs.iter().all(|sym| nss.contains(sym)) {
                    nss.insert(prod.lhs);
                    work_stack.push(prod.lhs);
                }
            }
        }
    }

    nss
}

pub struct NonTerminalBuilder<'builder, S: GrammarSymbol> {
    grammar_builder: &'builder mut GrammarBuilder<S>,
    lhs: S,
}

impl<'builder, S: GrammarSymbol> NonTerminalBuilder<'builder, S> {
    fn new(grammar_builder: &'builder mut GrammarBuilder<S>, lhs: S) -> Self {
        Self {
            grammar_builder,
            lhs,
        }
    }

    pub fn to(&mut self, rhs: Vec<S>) -> &mut Self {
        self.grammar_builder.add_production(&self.lhs, &rhs);
        self
    }

    pub fn epsilon(&mut self) -> &mut Self {
        self.grammar_builder.add_production(&self.lhs, &[]);
        self
    }
}

#[derive(Debug)]
pub enum BuildError {
    NoStartErr,
    StartNotNonTerminalErr(String),
    LhsNotNonTerminalErr(String),
    UndefinedSymbolErr(String),
    AmbiguousKindErr(String),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BuildError::NoStartErr => write!(f, "No start symbol specified for grammar"),
            BuildError::StartNotNonTerminalErr(ref symbol) => {
                write!(f, "Start symbol '{}' is not a non-terminal", symbol)
            }
            BuildError::LhsNotNonTerminalErr(ref symbol) => {
                write!(f, "Production left-hand side '{}' is not a non-terminal", symbol)
            }
            BuildError::UndefinedSymbolErr(ref symbol) => {
                write!(f, "Symbol '{}' is neither a terminal nor a non-terminal", symbol)
            }
            BuildError::AmbiguousKindErr(ref symbol) => {
                write!(f, "Symbol '{}' is both a terminal and a non-terminal", symbol)
            }
        }
    }
}

impl error::Error for BuildError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anbn_grammar() -> Grammar<char> {
        let mut builder = GrammarBuilder::new();
        builder.non_terminal('S').terminal('a').terminal('b');
        builder.from('S').to(vec!['a', 'S', 'b']).epsilon();
        builder.mark_start(&'S');
        builder.build().unwrap()
    }

    #[test]
    fn classify_symbols() {
        //setup
        let grammar = anbn_grammar();

        //exercise
        let s = grammar.classify(&'S');
        let a = grammar.classify(&'a');
        let c = grammar.classify(&'c');

        //verify
        assert_eq!(s, SymbolKind::NonTerminal);
        assert_eq!(a, SymbolKind::Terminal);
        assert_eq!(c, SymbolKind::Undefined);
    }

    #[test]
    fn augmented_start_production() {
        //setup
        let grammar = anbn_grammar();
        let aug = grammar.augmented_start();

        //exercise
        let prods = grammar.productions_for_lhs(aug);

        //verify
        assert_eq!(grammar.kind(aug), SymbolKind::NonTerminal);
        assert!(grammar.non_terminals().contains(&aug));
        assert_eq!(prods.len(), 1);
        assert_eq!(&prods[0].rhs[..], &[grammar.start()]);
        assert_ne!(aug, grammar.start());
        assert_eq!(grammar.symbol_string(aug), "S'");
    }

    #[test]
    fn productions_for_unknown_lhs_are_empty() {
        //setup
        let grammar = anbn_grammar();
        let a = grammar.encode(&'a').unwrap();

        //exercise
        let prods = grammar.productions_for_lhs(a);

        //verify
        assert!(prods.is_empty());
        assert!(grammar.productions_for_lhs(1000).is_empty());
    }

    #[test]
    fn duplicate_productions_are_kept() {
        //setup
        let mut builder = GrammarBuilder::new();
        builder.non_terminal('S').terminal('x');
        builder.from('S').to(vec!['x']).to(vec!['x']);
        builder.mark_start(&'S');

        //exercise
        let grammar = builder.build().unwrap();

        //verify
        let s = grammar.encode(&'S').unwrap();
        assert_eq!(grammar.productions_for_lhs(s).len(), 2);
        assert_eq!(
            grammar.production_string(&grammar.productions_for_lhs(s)[0]),
            "S -> x"
        );
    }

    #[test]
    fn nullable_set_is_transitive() {
        //setup
        let mut builder = GrammarBuilder::new();
        builder
            .non_terminal("A".to_string())
            .non_terminal("B".to_string())
            .non_terminal("C".to_string())
            .terminal("x".to_string());
        builder.from("A".to_string()).to(vec!["B".to_string(), "B".to_string()]);
        builder.from("B".to_string()).epsilon().to(vec!["x".to_string()]);
        builder.from("C".to_string()).to(vec!["B".to_string(), "x".to_string()]);
        builder.mark_start(&"A".to_string());

        //exercise
        let grammar = builder.build().unwrap();

        //verify
        let id = |name: &str| grammar.encode(&name.to_string()).unwrap();
        assert!(grammar.is_nullable(id("A")));
        assert!(grammar.is_nullable(id("B")));
        assert!(!grammar.is_nullable(id("C")));
        assert!(!grammar.is_nullable(id("x")));
        assert!(grammar.is_nullable(grammar.augmented_start()));
    }

    #[test]
    fn build_without_start() {
        //setup
        let mut builder: GrammarBuilder<char> = GrammarBuilder::new();
        builder.non_terminal('S');

        //exercise
        let res = builder.build();

        //verify
        assert_eq!(
            format!("{}", res.err().unwrap()),
            "No start symbol specified for grammar"
        );
    }

    #[test]
    fn build_terminal_start() {
        //setup
        let mut builder = GrammarBuilder::new();
        builder.terminal('a');
        builder.mark_start(&'a');

        //exercise
        let res = builder.build();

        //verify
        assert_eq!(
            format!("{}", res.err().unwrap()),
            "Start symbol 'a' is not a non-terminal"
        );
    }

    #[test]
    fn build_undefined_rhs_symbol() {
        //setup
        let mut builder = GrammarBuilder::new();
        builder.non_terminal('S').terminal('a');
        builder.from('S').to(vec!['a', 'z']);
        builder.mark_start(&'S');

        //exercise
        let res = builder.build();

        //verify
        assert_eq!(
            format!("{}", res.err().unwrap()),
            "Symbol 'z' is neither a terminal nor a non-terminal"
        );
    }

    #[test]
    fn build_terminal_lhs() {
        //setup
        let mut builder = GrammarBuilder::new();
        builder.non_terminal('S').terminal('a');
        builder.from('a').to(vec!['S']);
        builder.mark_start(&'S');

        //exercise
        let res = builder.build();

        //verify
        assert_eq!(
            format!("{}", res.err().unwrap()),
            "Production left-hand side 'a' is not a non-terminal"
        );
    }

    #[test]
    fn build_ambiguous_kind() {
        //setup
        let mut builder = GrammarBuilder::new();
        builder.non_terminal('S').terminal('S');
        builder.mark_start(&'S');

        //exercise
        let res = builder.build();

        //verify
        assert_eq!(
            format!("{}", res.err().unwrap()),
            "Symbol 'S' is both a terminal and a non-terminal"
        );
    }
}
