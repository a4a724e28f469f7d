use {
    crate::parse::{
        grammar::{Grammar, GrammarSymbol, Production, Symbol, SymbolKind},
        Recognizer, Verdict,
    },
    log::Level,
    std::{
        collections::{HashMap, HashSet, VecDeque},
        sync::Arc,
    },
};

pub struct EarleyRecognizer;

impl<S: GrammarSymbol> Recognizer<S> for EarleyRecognizer {
    fn check(&self, word: &[S], grammar: &Grammar<S>) -> Verdict {
        let mut scan: Vec<Symbol> = Vec::with_capacity(word.len());
        for (position, symbol) in word.iter().enumerate() {
            match grammar.encode(symbol) {
                Some(id) if grammar.kind(id) == SymbolKind::Terminal => scan.push(id),
                _ => {
                    debug!("Symbol '{}' at {} is not a terminal", symbol, position);
                    return Verdict::Malformed { position };
                }
            }
        }

        let chart = build_chart(&scan, grammar);

        if recognized(&chart, grammar) {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        }
    }
}

fn build_chart<S: GrammarSymbol>(scan: &[Symbol], grammar: &Grammar<S>) -> Chart {
    let mut chart = Chart::new(scan.len());

    for prod in grammar.productions_for_lhs(grammar.augmented_start()) {
        chart.column_mut(0).insert(Item::predicted(prod, 0), grammar);
    }

    for cursor in 0..chart.len() {
        if cursor > 0 {
            scan_op(cursor, scan[cursor - 1], grammar, &mut chart);

            if chart.column(cursor).is_empty() {
                debug!("Recognition failed at token {}", cursor);
                break;
            }
        }

        close_op(cursor, grammar, &mut chart);

        trace!("SET {}: {} items", cursor, chart.column(cursor).len());
        if log_enabled!(Level::Trace) {
            for item in chart.column(cursor).items() {
                trace!("    {}", item.to_string(grammar));
            }
        }
    }

    chart
}

/// Advances every item of the previous column expecting `terminal` into column `cursor`.
fn scan_op<S: GrammarSymbol>(
    cursor: usize,
    terminal: Symbol,
    grammar: &Grammar<S>,
    chart: &mut Chart,
) {
    let scanned: Vec<Item> = chart
        .column(cursor - 1)
        .waiting_on(NextSymbol::Terminal)
        .filter(|item| item.next_symbol() == Some(terminal))
        .map(Item::advanced)
        .collect();

    for item in scanned {
        chart.column_mut(cursor).insert(item, grammar);
    }
}

/// Runs predict and complete over column `cursor` until no new items appear.
fn close_op<S: GrammarSymbol>(cursor: usize, grammar: &Grammar<S>, chart: &mut Chart) {
    while let Some(index) = chart.column_mut(cursor).worklist.pop_front() {
        let item = chart.column(cursor).item(index).clone();

        match NextSymbol::of(&item, grammar) {
            NextSymbol::End => complete_op(&item, cursor, grammar, chart),
            NextSymbol::NonTerminal(symbol) => predict_op(&item, symbol, cursor, grammar, chart),
            NextSymbol::Terminal => {}
        }
    }

    chart.column_mut(cursor).seal();
}

fn predict_op<S: GrammarSymbol>(
    item: &Item,
    symbol: Symbol,
    cursor: usize,
    grammar: &Grammar<S>,
    chart: &mut Chart,
) {
    for prod in grammar.productions_for_lhs(symbol) {
        chart
            .column_mut(cursor)
            .insert(Item::predicted(prod, cursor), grammar);
    }

    // The empty completion of `symbol` may already have been processed in this column.
    if grammar.is_nullable(symbol) {
        chart.column_mut(cursor).insert(item.advanced(), grammar);
    }
}

fn complete_op<S: GrammarSymbol>(
    item: &Item,
    cursor: usize,
    grammar: &Grammar<S>,
    chart: &mut Chart,
) {
    let completed: Vec<Item> = chart
        .column(item.origin)
        .waiting_on(NextSymbol::NonTerminal(item.head))
        .map(Item::advanced)
        .collect();

    for new_item in completed {
        chart.column_mut(cursor).insert(new_item, grammar);
    }
}

fn recognized<S: GrammarSymbol>(chart: &Chart, grammar: &Grammar<S>) -> bool {
    let augmented_start = grammar.augmented_start();

    grammar
        .productions_for_lhs(augmented_start)
        .iter()
        .any(|prod| {
            chart.last().contains(&Item {
                head: augmented_start,
                origin: 0,
                dot: prod.rhs.len(),
                body: prod.rhs.clone(),
            })
        })
}

struct Chart {
    columns: Vec<Column>,
}

impl Chart {
    /// Creates an empty chart with one column per position of a scan of length `len`.
    fn new(len: usize) -> Self {
        Chart {
            columns: (0..=len).map(|_| Column::new()).collect(),
        }
    }

    fn len(&self) -> usize {
        self.columns.len()
    }

    fn column(&self, i: usize) -> &Column {
        &self.columns[i]
    }

    fn column_mut(&mut self, i: usize) -> &mut Column {
        &mut self.columns[i]
    }

    fn last(&self) -> &Column {
        &self.columns[self.columns.len() - 1]
    }
}

struct Column {
    items: Vec<Item>,
    seen: HashSet<Item>,
    by_next: HashMap<NextSymbol, Vec<usize>>,
    worklist: VecDeque<usize>,
    sealed: bool,
}

impl Column {
    fn new() -> Self {
        Column {
            items: Vec::new(),
            seen: HashSet::new(),
            by_next: HashMap::new(),
            worklist: VecDeque::new(),
            sealed: false,
        }
    }

    /// Adds `item` unless an equal item is already present, returning whether it was added.
    fn insert<S: GrammarSymbol>(&mut self, item: Item, grammar: &Grammar<S>) -> bool {
        debug_assert!(!self.sealed, "Insertion into sealed column");

        if self.seen.contains(&item) {
            return false;
        }

        let next = NextSymbol::of(&item, grammar);
        let index = self.items.len();

        self.by_next.entry(next).or_insert_with(Vec::new).push(index);
        if next != NextSymbol::Terminal {
            self.worklist.push_back(index);
        }

        self.seen.insert(item.clone());
        self.items.push(item);
        true
    }

    fn seal(&mut self) {
        self.worklist = VecDeque::new();
        self.sealed = true;
    }

    fn contains(&self, item: &Item) -> bool {
        self.seen.contains(item)
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn item(&self, i: usize) -> &Item {
        &self.items[i]
    }

    fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Items whose next symbol is `next`, in the order they were added.
    fn waiting_on<'scope>(&'scope self, next: NextSymbol) -> impl Iterator<Item = &'scope Item> {
        self.by_next
            .get(&next)
            .into_iter()
            .flat_map(|indices| indices.iter())
            .map(move |&i| &self.items[i])
    }
}

/// Chart index key: the symbol after the dot, with all terminals sharing one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NextSymbol {
    NonTerminal(Symbol),
    Terminal,
    End,
}

impl NextSymbol {
    fn of<S: GrammarSymbol>(item: &Item, grammar: &Grammar<S>) -> Self {
        match item.next_symbol() {
            None => NextSymbol::End,
            Some(symbol) => {
                if grammar.kind(symbol) == SymbolKind::NonTerminal {
                    NextSymbol::NonTerminal(symbol)
                } else {
                    NextSymbol::Terminal
                }
            }
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct Item {
    head: Symbol,
    origin: usize,
    dot: usize,
    body: Arc<[Symbol]>,
}

impl Item {
    fn predicted(prod: &Production, origin: usize) -> Self {
        Item {
            head: prod.lhs,
            origin,
            dot: 0,
            body: prod.rhs.clone(),
        }
    }

    fn advanced(&self) -> Self {
        Item {
            head: self.head,
            origin: self.origin,
            dot: self.dot + 1,
            body: self.body.clone(),
        }
    }

    fn next_symbol(&self) -> Option<Symbol> {
        self.body.get(self.dot).cloned()
    }

    fn to_string<S: GrammarSymbol>(&self, grammar: &Grammar<S>) -> String {
        let mut rule_string = format!("{} -> ", grammar.symbol_string(self.head));
        for (i, &symbol) in self.body.iter().enumerate() {
            if i == self.dot {
                rule_string.push_str(". ");
            }
            rule_string.push_str(&grammar.symbol_string(symbol));
            rule_string.push(' ');
        }
        if self.dot == self.body.len() {
            rule_string.push_str(". ");
        }
        format!("{} ({})", rule_string, self.origin)
    }
}
