//! Line-oriented front end: parses typed commands into intents and draws the
//! active screen as text.

use sternhalma_core::coord::BOARD_SIZE;
use sternhalma_core::projection::{BOARD_H_PADDING, CIR_DIAMETER, CIR_H_PADDING};
use sternhalma_core::session::{GameScreen, PlayerStatus, Seat};
use sternhalma_core::{
    project, BoardCoordinate, Component, ConnectionStatus, CoordError, Intent, Player, SeatAction,
    SessionStateMachine,
};
use std::fmt::Write;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  create                 start a new game
  join <code>            join a game by its 8-character code
  name <name>            enter your name
  seat|bot|kick|leave <color>
                         take a seat, add or remove a bot, leave your seat
  start                  start the game
  click <col> <row>      pick a piece or the next cell of your move
  clear                  drop the move you are building
  end                    submit your move (an empty move passes)
  back | menu            leave the current screen
  help | quit";

/// Text columns per cell; cells sit two columns apart, offset rows one
const TEXT_COLUMN_WIDTH: f64 = (CIR_DIAMETER + CIR_H_PADDING) / 2.0;

/// Width of the drawn board in text columns
const TEXT_COLUMNS: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command `{0}`, type `help` for a list")]
    UnknownCommand(String),

    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Unknown color `{0}`")]
    UnknownColor(String),

    #[error("`{0}` is not a number")]
    InvalidNumber(String),

    #[error(transparent)]
    InvalidCoordinate(#[from] CoordError),
}

/// Parse one input line.
///
/// Returns `None` for a blank line.
pub fn parse_command(line: &str) -> Option<Result<Command, CommandError>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(w, r)| (w, r.trim()))
        .unwrap_or((line, ""));
    Some(parse_words(&word.to_lowercase(), rest))
}

fn parse_words(word: &str, rest: &str) -> Result<Command, CommandError> {
    let intent = match word {
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        "create" => Intent::CreateGame,
        "join" => Intent::JoinGame {
            code: required(rest, "join", "a game code")?.to_string(),
        },
        "name" => Intent::SubmitName {
            name: rest.to_string(),
        },
        "seat" => seat_intent(rest, "seat", SeatAction::TakeSeat)?,
        "bot" => seat_intent(rest, "bot", SeatAction::AddBot)?,
        "kick" => seat_intent(rest, "kick", SeatAction::RemoveBot)?,
        "leave" => seat_intent(rest, "leave", SeatAction::LeaveSeat)?,
        "start" => Intent::StartGame,
        "click" | "c" => {
            let mut parts = rest.split_whitespace();
            let col = number(parts.next(), "click")?;
            let row = number(parts.next(), "click")?;
            Intent::ClickCell(BoardCoordinate::new(col, row)?)
        }
        "clear" => Intent::ClearMove,
        "end" | "submit" | "pass" => Intent::SubmitMove,
        "menu" => Intent::MainMenu,
        "back" => Intent::Back,
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };
    Ok(Command::Intent(intent))
}

fn required<'a>(
    rest: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(rest)
    }
}

fn number(word: Option<&str>, command: &'static str) -> Result<i32, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument {
        command,
        argument: "a column and a row",
    })?;
    word.parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

fn seat_intent(
    rest: &str,
    command: &'static str,
    action: SeatAction,
) -> Result<Intent, CommandError> {
    let color = parse_color(required(rest, command, "a color")?)?;
    Ok(Intent::Seat { color, action })
}

/// A seat color by name or number
fn parse_color(word: &str) -> Result<Player, CommandError> {
    if let Ok(n) = word.parse::<u8>() {
        return match Player::try_from(n) {
            Ok(player) if !player.is_spectator() => Ok(player),
            _ => Err(CommandError::UnknownColor(word.to_string())),
        };
    }
    Player::COLORS
        .into_iter()
        .find(|p| p.name().eq_ignore_ascii_case(word))
        .ok_or_else(|| CommandError::UnknownColor(word.to_string()))
}

fn seat_command(action: SeatAction) -> &'static str {
    match action {
        SeatAction::TakeSeat => "seat",
        SeatAction::AddBot => "bot",
        SeatAction::RemoveBot => "kick",
        SeatAction::LeaveSeat => "leave",
    }
}

/// Draw the current screen
pub fn render(session: &SessionStateMachine, status: ConnectionStatus) -> String {
    let mut out = String::new();
    match status {
        ConnectionStatus::Connected => {}
        ConnectionStatus::Connecting => out.push_str("(reconnecting...)\n"),
        ConnectionStatus::Unavailable => out.push_str("(unable to connect to the server)\n"),
    }

    for component in session.active_components() {
        match component {
            Component::Title => out.push_str("=== Sternhalma ===\n"),
            Component::CreateGameButton => out.push_str("  create              start a new game\n"),
            Component::GameCodeInput => {}
            Component::JoinGameButton => out.push_str("  join <code>         join a game\n"),
            Component::NameInput => out.push_str("  name <name>         enter your name\n"),
            Component::NextButton => {}
            Component::BackButton => out.push_str("  back\n"),
            Component::Notice(notice) => {
                let _ = writeln!(out, "! {}", notice.message());
            }
            Component::GameCode(code) => {
                let _ = writeln!(out, "Game code: {}", code);
            }
            Component::Seat { color, seat } => {
                let commands: Vec<String> = seat
                    .actions()
                    .iter()
                    .map(|a| format!("{} {}", seat_command(*a), color.name().to_lowercase()))
                    .collect();
                let label = match seat {
                    Seat::Empty => "-".to_string(),
                    other => other.label(),
                };
                let _ = writeln!(
                    out,
                    "  {:<8}{:<24}{}",
                    color.name(),
                    label,
                    commands.join(" | ")
                );
            }
            Component::StartButton => out.push_str("  start\n"),
            Component::Board => out.push_str(&draw_board(session.game())),
            Component::PreviousMove => {
                let path = session.game().previous_move();
                if !path.is_empty() {
                    let _ = writeln!(out, "Last move: {}", format_path(path));
                }
            }
            Component::CurrentMove => {
                let path = session.game().current_move().path();
                if !path.is_empty() {
                    let _ = writeln!(out, "Your move: {}", format_path(path));
                }
            }
            Component::Roster => {
                for player in session.game().roster() {
                    let marker = if player.is_turn { ">" } else { " " };
                    let status = match player.status {
                        PlayerStatus::Human => "",
                        PlayerStatus::Bot => " [bot]",
                        PlayerStatus::Reconnecting => " [reconnecting]",
                    };
                    let you = if player.is_local { " (You)" } else { "" };
                    let _ = writeln!(
                        out,
                        "{} {:<8}{}{}{}",
                        marker,
                        player.color.name(),
                        player.name,
                        status,
                        you
                    );
                }
            }
            Component::SpectatingBanner => out.push_str("You are spectating!\n"),
            Component::Winner(winner) => {
                let _ = writeln!(out, "{} wins!", winner.name());
            }
            Component::MainMenuButton => out.push_str("  menu\n"),
            Component::EndTurnButton => out.push_str("  click <col> <row> | end\n"),
            Component::ClearMoveButton => out.push_str("  clear\n"),
        }
    }
    out
}

fn format_path(path: &[BoardCoordinate]) -> String {
    path.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn glyph(player: Player) -> char {
    match player {
        Player::Spectator => '.',
        Player::Red => 'R',
        Player::Blue => 'B',
        Player::Yellow => 'Y',
        Player::Green => 'G',
        Player::Orange => 'O',
        Player::Purple => 'P',
    }
}

/// The board laid out with `project`, one text line per row.
///
/// The in-progress move is shown applied; highlighted cells are `*` and
/// cells the piece passed through are `~`.
fn draw_board(game: &GameScreen) -> String {
    let path = game.current_move().path();
    let board = game.board().with_path_preview(path);
    let mut lines = vec![vec![' '; TEXT_COLUMNS]; BOARD_SIZE];

    for (coord, occupant) in board.iter() {
        let x = project(coord).x;
        let column = ((x - BOARD_H_PADDING) / TEXT_COLUMN_WIDTH).round() as usize;
        let glyph = if game.highlights().contains(&coord) {
            '*'
        } else if occupant.is_spectator() && path.contains(&coord) {
            '~'
        } else {
            glyph(occupant)
        };
        if let Some(cell) = lines
            .get_mut(coord.row() as usize)
            .and_then(|line| line.get_mut(column))
        {
            *cell = glyph;
        }
    }

    let mut out = String::new();
    for (row, line) in lines.iter().enumerate() {
        let text: String = line.iter().collect();
        let _ = writeln!(out, "{:>2}  {}", row, text.trim_end());
    }
    out
}
