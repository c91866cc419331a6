use turtle_config::observer::ObserverConfig;
use turtle_core::preprocess::normalize_tile_text;
use turtle_dom::{Document, NodeId, Selector, SelectorError};

/// Letters of the row being typed, lowercased, in tile order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessCandidate {
    word: String,
}

impl GuessCandidate {
    pub fn as_str(&self) -> &str {
        &self.word
    }

    pub fn len(&self) -> usize {
        self.word.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    pub fn into_word(self) -> String {
        self.word
    }
}

/// Reads the in-progress guess out of the grid. Holds no memory between scans.
pub struct TileScanner {
    tiles: Selector,
    state_attribute: String,
    pending_state: String,
    word_length: usize,
}

impl TileScanner {
    pub fn new(config: &ObserverConfig) -> Result<Self, SelectorError> {
        Ok(Self {
            tiles: Selector::parse(&config.tile_selector)?,
            state_attribute: config.state_attribute.clone(),
            pending_state: config.pending_state.clone(),
            word_length: config.word_length,
        })
    }

    pub fn scan(&self, document: &Document) -> Option<GuessCandidate> {
        // Pending tiles grouped by row, rows in document order
        let mut rows: Vec<(Option<NodeId>, Vec<NodeId>)> = Vec::new();
        for tile in document.query_selector_all(&self.tiles) {
            if document.attribute(tile, &self.state_attribute).as_deref()
                != Some(self.pending_state.as_str())
            {
                continue;
            }
            let row = document.parent(tile);
            match rows.iter_mut().find(|(r, _)| *r == row) {
                Some((_, tiles)) => tiles.push(tile),
                None => rows.push((row, vec![tile])),
            }
        }

        tracing::debug!("Found {} rows with pending tiles", rows.len());

        rows.into_iter().find_map(|(_, tiles)| self.read_row(document, &tiles))
    }

    fn read_row(&self, document: &Document, tiles: &[NodeId]) -> Option<GuessCandidate> {
        if tiles.len() != self.word_length {
            tracing::debug!(
                "Expected {} pending tiles, found {}",
                self.word_length,
                tiles.len()
            );
            return None;
        }

        let mut word = String::with_capacity(self.word_length);
        for (i, &tile) in tiles.iter().enumerate() {
            let letter = normalize_tile_text(&document.text_content(tile));
            if letter.is_empty() {
                tracing::debug!("Tile {i} is empty, word incomplete");
                return None;
            }
            word.push_str(&letter);
        }

        tracing::debug!(word = %word, "Complete word found");
        Some(GuessCandidate { word })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GameBoard;

    fn scanner() -> TileScanner {
        TileScanner::new(&ObserverConfig::default()).unwrap()
    }

    #[test]
    fn four_letters_is_not_a_candidate() {
        let doc = Document::new();
        let mut board = GameBoard::new(&doc, "crane");
        for c in "MANG".chars() {
            board.type_letter(c);
        }
        assert_eq!(scanner().scan(&doc), None);
    }

    #[test]
    fn five_letters_concatenate_lowercased() {
        let doc = Document::new();
        let mut board = GameBoard::new(&doc, "crane");
        for c in "MANGO".chars() {
            board.type_letter(c);
        }
        assert_eq!(scanner().scan(&doc).unwrap().as_str(), "mango");
    }

    #[test]
    fn evaluated_rows_are_ignored() {
        let doc = Document::new();
        let mut board = GameBoard::new(&doc, "crane");
        for c in "BOARD".chars() {
            board.type_letter(c);
        }
        board.submit();
        assert_eq!(scanner().scan(&doc), None);

        for c in "SLATE".chars() {
            board.type_letter(c);
        }
        assert_eq!(scanner().scan(&doc).unwrap().as_str(), "slate");
    }

    #[test]
    fn blank_pending_tile_blocks_the_row() {
        let doc = Document::new();
        let mut board = GameBoard::new(&doc, "crane");
        for c in "MANGO".chars() {
            board.type_letter(c);
        }
        let tile = board.tile(0, 2);
        doc.set_text(tile, "  ");
        assert_eq!(scanner().scan(&doc), None);
    }

    #[test]
    fn first_qualifying_row_wins() {
        let doc = Document::new();
        let body = doc.body();
        for word in ["FIRST", "LATER"] {
            let row = doc.create_element("div");
            doc.append_child(body, row);
            for letter in word.chars() {
                let tile = doc.create_element("div");
                doc.add_class(tile, "Tile-module_tile__UWEHN");
                doc.set_attribute(tile, "data-state", "tbd");
                doc.set_text(tile, &letter.to_string());
                doc.append_child(row, tile);
            }
        }
        assert_eq!(scanner().scan(&doc).unwrap().as_str(), "first");
    }
}
