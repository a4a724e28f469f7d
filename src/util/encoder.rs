use std::{collections::HashMap, hash::Hash};

/// Interns values of `T` as dense `usize` ids, in first-seen order.
pub struct Encoder<T: Eq + Hash + Clone> {
    encoder: HashMap<T, usize>,
    decoder: Vec<T>,
}

impl<T: Eq + Hash + Clone> Encoder<T> {
    pub fn new() -> Self {
        Encoder {
            encoder: HashMap::new(),
            decoder: Vec::new(),
        }
    }

    pub fn encode(&mut self, val: &T) -> usize {
        if let Some(&key) = self.encoder.get(val) {
            key
        } else {
            let key = self.decoder.len();
            self.decoder.push(val.clone());
            self.encoder.insert(val.clone(), key);
            key
        }
    }

    /// Like `encode`, but never allocates a new id.
    pub fn lookup(&self, val: &T) -> Option<usize> {
        self.encoder.get(val).cloned()
    }

    pub fn decode(&self, cipher: usize) -> Option<&T> {
        self.decoder.get(cipher)
    }

    pub fn len(&self) -> usize {
        self.decoder.len()
    }
}
