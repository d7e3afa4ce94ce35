//! Wire protocol shared by the arena server and its clients.
//!
//! Client to server messages are one or two ASCII bytes with no terminator.
//! Server to client messages are a single `|` separated line describing the
//! whole world, terminated by `\n`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const BLOCK_SIZE: i32 = 64;
pub const WIDTH: i32 = 1024;
pub const HEIGHT: i32 = 568 + 32;

/// Largest exclusive top-left x coordinate a sprite may occupy.
pub const X_MAX: i32 = WIDTH - BLOCK_SIZE;
/// Largest exclusive top-left y coordinate a sprite may occupy.
pub const Y_MAX: i32 = HEIGHT - BLOCK_SIZE;

pub const DEFAULT_PORT: u16 = 3000;

const FIELD_SEPARATOR: char = '|';
const CELL_SEPARATOR: char = ';';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty message")]
    Empty,
    #[error("unknown command byte {0:#04x}")]
    UnknownCommand(u8),
    #[error("move command without a direction")]
    MissingDirection,
    #[error("unknown move direction byte {0:#04x}")]
    UnknownDirection(u8),
    #[error("unknown snapshot field {0:?}")]
    UnknownField(String),
    #[error("invalid coordinate {0:?}")]
    InvalidCoordinate(String),
}

/// Integer pixel position of a sprite's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Position {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DecodeError::InvalidCoordinate(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        Ok(Position {
            x: x.parse().map_err(|_| invalid())?,
            y: y.parse().map_err(|_| invalid())?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step on the screen grid; y grows downwards.
    pub fn unit(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    fn as_byte(&self) -> u8 {
        match self {
            Direction::Up => b'u',
            Direction::Down => b'd',
            Direction::Left => b'l',
            Direction::Right => b'r',
        }
    }

    fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        match byte {
            b'u' => Ok(Direction::Up),
            b'd' => Ok(Direction::Down),
            b'l' => Ok(Direction::Left),
            b'r' => Ok(Direction::Right),
            other => Err(DecodeError::UnknownDirection(other)),
        }
    }
}

/// A client to server command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Disconnect,
    PlaceBomb,
    Move(Direction),
}

impl Command {
    /// Decodes a datagram. Only the leading command byte and, for moves, the
    /// direction byte are significant; anything after them is ignored.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let (&command, rest) = data.split_first().ok_or(DecodeError::Empty)?;
        match command {
            b'c' => Ok(Command::Connect),
            b'd' => Ok(Command::Disconnect),
            b'b' => Ok(Command::PlaceBomb),
            b'u' => {
                let &direction = rest.first().ok_or(DecodeError::MissingDirection)?;
                Direction::from_byte(direction).map(Command::Move)
            }
            other => Err(DecodeError::UnknownCommand(other)),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            Command::Connect => vec![b'c'],
            Command::Disconnect => vec![b'd'],
            Command::PlaceBomb => vec![b'b'],
            Command::Move(direction) => vec![b'u', direction.as_byte()],
        }
    }
}

/// Everything a client needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub players: Vec<Position>,
    pub bombs: Vec<Position>,
    pub explosions: Vec<Vec<Position>>,
    pub walls: Vec<Position>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
            && self.bombs.is_empty()
            && self.explosions.is_empty()
            && self.walls.is_empty()
    }

    /// Serializes the snapshot as one newline terminated line. Empty lists
    /// produce no field at all.
    pub fn encode(&self) -> String {
        let mut fields: Vec<String> = Vec::new();

        fields.extend(self.players.iter().map(|p| format!("p{p}")));
        fields.extend(self.bombs.iter().map(|b| format!("b{b}")));
        fields.extend(
            self.explosions
                .iter()
                .filter(|cells| !cells.is_empty())
                .map(|cells| format!("e{}", join_cells(cells))),
        );
        if !self.walls.is_empty() {
            fields.push(format!("w{}", join_cells(&self.walls)));
        }

        let mut line = fields.join(&FIELD_SEPARATOR.to_string());
        line.push('\n');
        line
    }

    pub fn decode(line: &str) -> Result<Self, DecodeError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut snapshot = Snapshot::default();
        if line.is_empty() {
            return Ok(snapshot);
        }

        for field in line.split(FIELD_SEPARATOR) {
            let mut chars = field.chars();
            let prefix = chars.next().ok_or_else(|| DecodeError::UnknownField(String::new()))?;
            let payload = chars.as_str();
            match prefix {
                'p' => snapshot.players.push(payload.parse()?),
                'b' => snapshot.bombs.push(payload.parse()?),
                'e' => snapshot.explosions.push(split_cells(payload)?),
                'w' => snapshot.walls.extend(split_cells(payload)?),
                _ => return Err(DecodeError::UnknownField(field.to_string())),
            }
        }

        Ok(snapshot)
    }
}

fn join_cells(cells: &[Position]) -> String {
    cells
        .iter()
        .map(Position::to_string)
        .collect::<Vec<_>>()
        .join(&CELL_SEPARATOR.to_string())
}

fn split_cells(payload: &str) -> Result<Vec<Position>, DecodeError> {
    payload.split(CELL_SEPARATOR).map(str::parse).collect()
}

/// Drawable area on the presentation side.
///
/// Replaces "draw and ignore failures": a consumer asks whether a sprite at a
/// decoded position lands on screen before drawing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True if a `size` x `size` sprite at `pos` is at least partly visible.
    pub fn contains(&self, pos: Position, size: i32) -> bool {
        pos.x + size > 0 && pos.y + size > 0 && pos.x < self.width && pos.y < self.height
    }
}
