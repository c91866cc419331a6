//! Game grid rendered into a [`Document`], for the interactive binary and tests.

use turtle_dom::{Document, NodeId};

pub const ROWS: usize = 6;
pub const WORD_LENGTH: usize = 5;

const GAME_CLASS: &str = "App-module_game__yruqo";
const BOARD_CLASS: &str = "Board-module_board__jeoPS";
const ROW_CLASS: &str = "Row-module_row__pwpBq";
const TILE_CLASS: &str = "Tile-module_tile__UWEHN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Empty,
    Tbd,
    Correct,
    Present,
    Absent,
}

impl TileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TileState::Empty => "empty",
            TileState::Tbd => "tbd",
            TileState::Correct => "correct",
            TileState::Present => "present",
            TileState::Absent => "absent",
        }
    }
}

/// Per-letter evaluation of `guess` against `answer`
pub fn get_feedback(guess: &str, answer: &str) -> [TileState; WORD_LENGTH] {
    let guess: Vec<char> = guess.chars().collect();
    let answer: Vec<char> = answer.chars().collect();
    let mut feedback = [TileState::Absent; WORD_LENGTH];
    let mut unmatched = Vec::new();

    for i in 0..WORD_LENGTH {
        if guess.get(i).is_some() && guess.get(i) == answer.get(i) {
            feedback[i] = TileState::Correct;
        } else if let Some(&c) = answer.get(i) {
            unmatched.push(c);
        }
    }

    for i in 0..WORD_LENGTH {
        if feedback[i] == TileState::Correct {
            continue;
        }
        if let Some(pos) = guess.get(i).and_then(|c| unmatched.iter().position(|u| u == c)) {
            unmatched.swap_remove(pos);
            feedback[i] = TileState::Present;
        }
    }

    feedback
}

pub struct GameBoard {
    document: Document,
    game: NodeId,
    tiles: Vec<Vec<NodeId>>,
    answer: String,
    row: usize,
    col: usize,
}

impl GameBoard {
    pub fn new(document: &Document, answer: &str) -> Self {
        let game = document.create_element("div");
        document.add_class(game, GAME_CLASS);
        let board = document.create_element("div");
        document.add_class(board, BOARD_CLASS);
        document.append_child(game, board);

        let tiles = (0..ROWS)
            .map(|_| {
                let row = document.create_element("div");
                document.add_class(row, ROW_CLASS);
                document.append_child(board, row);
                (0..WORD_LENGTH)
                    .map(|_| {
                        let tile = document.create_element("div");
                        document.add_class(tile, TILE_CLASS);
                        document.set_attribute(tile, "data-state", TileState::Empty.as_str());
                        document.append_child(row, tile);
                        tile
                    })
                    .collect()
            })
            .collect();

        document.append_child(document.body(), game);

        Self {
            document: document.clone(),
            game,
            tiles,
            answer: answer.to_lowercase(),
            row: 0,
            col: 0,
        }
    }

    pub fn game(&self) -> NodeId {
        self.game
    }

    pub fn tile(&self, row: usize, col: usize) -> NodeId {
        self.tiles[row][col]
    }

    pub fn is_finished(&self) -> bool {
        self.row >= ROWS
    }

    /// Returns false when the row is full or the game is over
    pub fn type_letter(&mut self, letter: char) -> bool {
        if self.is_finished() || self.col >= WORD_LENGTH || !letter.is_alphabetic() {
            return false;
        }
        let tile = self.tiles[self.row][self.col];
        self.document
            .set_text(tile, &letter.to_uppercase().to_string());
        self.document
            .set_attribute(tile, "data-state", TileState::Tbd.as_str());
        self.col += 1;
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.is_finished() || self.col == 0 {
            return false;
        }
        self.col -= 1;
        let tile = self.tiles[self.row][self.col];
        self.document.set_text(tile, "");
        self.document
            .set_attribute(tile, "data-state", TileState::Empty.as_str());
        true
    }

    /// Evaluate the full row and move to the next one
    pub fn submit(&mut self) -> Option<[TileState; WORD_LENGTH]> {
        if self.is_finished() || self.col < WORD_LENGTH {
            return None;
        }
        let guess: String = self.tiles[self.row]
            .iter()
            .map(|&tile| self.document.text_content(tile).to_lowercase())
            .collect();
        let feedback = get_feedback(&guess, &self.answer);
        for (&tile, state) in self.tiles[self.row].iter().zip(feedback) {
            self.document.set_attribute(tile, "data-state", state.as_str());
        }
        self.row += 1;
        self.col = 0;
        Some(feedback)
    }
}
