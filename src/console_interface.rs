use crate::commands::Input;
use crate::core::{BoundsOriginRoot, Direction, EntityKind, GameState, Level, Vec2};
use crate::error::LevelError;
use crate::game_loop::{BoardView, Sprite};
use crate::levels::LevelRequest;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use std::io;

// Tiles: '#' wall, '@' player, '$' box, '.' target, '*' box on target, '+' player on target, ' ' floor.
pub fn parse_level(s: &str) -> Result<Level, LevelError> {
    let mut walls = Vec::new();
    let mut targets = Vec::new();
    let mut boxes = Vec::new();
    let mut player = None;
    let mut width = 0;

    let mut y = 0;
    for line in s.lines() {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }

        for (x, ch) in line.chars().enumerate() {
            let pos = Vec2 {
                x: x as i32,
                y: y as i32,
            };
            match ch {
                '#' => walls.push(pos),
                '.' => targets.push(pos),
                '$' => boxes.push(pos),
                '*' => {
                    boxes.push(pos);
                    targets.push(pos);
                }
                '@' | '+' => {
                    if let Some(first) = player.replace(pos) {
                        return Err(LevelError::MultiplePlayers { first, second: pos });
                    }
                    if ch == '+' {
                        targets.push(pos);
                    }
                }
                _ => {}
            }
        }
        width = width.max(line.chars().count());
        y += 1;
    }

    let player = player.ok_or(LevelError::MissingPlayer)?;
    Level::new(
        BoundsOriginRoot::new(width as i32, y as i32),
        walls,
        targets,
        boxes,
        player,
    )
}

pub fn render_game_to_string(game: &GameState) -> String {
    let level = game.level();
    let mut result = String::new();
    for y in 0..level.height() {
        for x in 0..level.width() {
            let pos = Vec2 { x, y };
            let has_player = pos == game.player();
            let has_box = game.has_box_at(&pos);
            let ch = if level.is_wall(&pos) {
                '#'
            } else if level.is_target(&pos) {
                if has_player { '+' } else if has_box { '*' } else { '.' }
            } else if has_player {
                '@'
            } else if has_box {
                '$'
            } else {
                ' '
            };
            result.push(ch);
        }
        result.push('\n');
    }
    result
}

/// Like [`render_game_to_string`] but the player glyph shows facing and
/// whether it is mid-step.
pub fn render_view_to_string(view: &BoardView) -> String {
    let width = view.game.level().width() as usize + 1;
    let mut chars: Vec<char> = render_game_to_string(&view.game).chars().collect();
    for sprite in &view.sprites {
        let index = sprite.position.y as usize * width + sprite.position.x as usize;
        if let Some(ch) = sprite_glyph(sprite) {
            if let Some(slot) = chars.get_mut(index) {
                *slot = ch;
            }
        }
    }
    chars.into_iter().collect()
}

fn sprite_glyph(sprite: &Sprite) -> Option<char> {
    match (sprite.kind, sprite.facing) {
        (EntityKind::Player, Some(facing)) if sprite.in_motion => Some(match facing {
            Direction::Up => '^',
            Direction::Down => 'v',
            Direction::Left => '<',
            Direction::Right => '>',
        }),
        _ => None,
    }
}

fn facing_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "up",
        Direction::Down => "down",
        Direction::Left => "left",
        Direction::Right => "right",
    }
}

pub struct GameRenderState {
    pub view: BoardView,
    pub level_count: usize,
    pub banner: Option<String>,
    pub level_entry: String,
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, Box<dyn std::error::Error + Send + Sync>>
{
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn cleanup_terminal() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

pub fn render_game(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &GameRenderState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    terminal.draw(|f| {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3), Constraint::Length(3)])
            .split(f.area());

        // Game area
        let view = &state.view;
        let game_text = render_view_to_string(view);
        let title = format!("Sokoban - level {}/{}", view.level_index, state.level_count);
        let game_paragraph = Paragraph::new(game_text)
            .block(Block::default().borders(Borders::ALL).title(title))
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center);
        f.render_widget(game_paragraph, chunks[0]);

        // Status
        let facing = view.player().and_then(|p| p.facing).map(facing_label).unwrap_or("-");
        let status = match &state.banner {
            Some(banner) => banner.clone(),
            None => format!(
                "Boxes {}/{} | Moves {} | Pushes {} | Facing {}",
                view.game.boxes_on_targets(),
                view.game.boxes().len(),
                view.moves,
                view.pushes,
                facing,
            ),
        };
        let status_style = if state.banner.is_some() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let status_paragraph = Paragraph::new(status)
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .style(status_style)
            .alignment(Alignment::Center);
        f.render_widget(status_paragraph, chunks[1]);

        // Instructions
        let mut instructions =
            "WASD/arrows move | R reset | [ ] prev/next | digits+Enter jump | Q quit".to_string();
        if !state.level_entry.is_empty() {
            instructions = format!("{} | Level: {}_", instructions, state.level_entry);
        }
        let instruction_paragraph = Paragraph::new(instructions)
            .block(Block::default().borders(Borders::ALL).title("Instructions"))
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center);
        f.render_widget(instruction_paragraph, chunks[2]);
    })?;
    Ok(())
}

pub enum ConsoleInput {
    Input(Input),
    /// A digit or backspace while typing a level number.
    Editing,
    Timeout,
}

/// Decodes key presses. Digits accumulate in `level_entry` until Enter
/// turns them into a level selection.
pub fn handle_input(level_entry: &mut String) -> Result<ConsoleInput, Box<dyn std::error::Error + Send + Sync>> {
    if event::poll(std::time::Duration::from_millis(50))? {
        if let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        {
            return Ok(decode_key(code, level_entry));
        }
    }
    Ok(ConsoleInput::Timeout)
}

pub fn decode_key(code: KeyCode, level_entry: &mut String) -> ConsoleInput {
    let input = match code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Input::Quit,
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Input::Move(Direction::Up),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Input::Move(Direction::Down),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Input::Move(Direction::Left),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Input::Move(Direction::Right),
        KeyCode::Char('r') | KeyCode::Char('R') => Input::Reset,
        KeyCode::Char('[') => Input::PreviousLevel,
        KeyCode::Char(']') => Input::NextLevel,
        KeyCode::Char(c) if c.is_ascii_digit() || (c == '-' && level_entry.is_empty()) => {
            level_entry.push(c);
            return ConsoleInput::Editing;
        }
        KeyCode::Backspace if !level_entry.is_empty() => {
            level_entry.pop();
            return ConsoleInput::Editing;
        }
        KeyCode::Enter if !level_entry.is_empty() => {
            let request = LevelRequest::parse(level_entry);
            level_entry.clear();
            Input::SelectLevel(request)
        }
        _ => Input::NoOp,
    };
    ConsoleInput::Input(input)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assert_eq_text;

    #[test]
    fn parse_then_render_is_stable() {
        let level = r#"
#######
#.$  *#
#  +  #
#######
"#;
        let parsed = parse_level(level).unwrap();
        let game = GameState::new(std::sync::Arc::new(parsed));
        let rendered = render_game_to_string(&game);

        assert_eq_text!(
            rendered.trim_matches('\n'),
            "#######\n#.$  *#\n#  +  #\n#######"
        );
    }

    #[test]
    fn parse_rejects_second_player() {
        let err = parse_level("@ @").unwrap_err();

        assert!(matches!(
            err,
            LevelError::MultiplePlayers { first, second }
                if first == Vec2::new(0, 0) && second == Vec2::new(2, 0)
        ));
    }

    #[test]
    fn parse_rejects_player_on_target_after_player() {
        assert!(matches!(
            parse_level("#@.+#"),
            Err(LevelError::MultiplePlayers { .. })
        ));
    }

    #[test]
    fn parse_requires_player() {
        assert!(matches!(parse_level("#$.#"), Err(LevelError::MissingPlayer)));
    }

    #[test]
    fn digits_accumulate_into_level_selection() {
        let mut entry = String::new();

        assert!(matches!(decode_key(KeyCode::Char('1'), &mut entry), ConsoleInput::Editing));
        assert!(matches!(decode_key(KeyCode::Char('2'), &mut entry), ConsoleInput::Editing));
        let ConsoleInput::Input(input) = decode_key(KeyCode::Enter, &mut entry) else {
            panic!("expected an input");
        };

        assert_eq!(input, Input::SelectLevel(LevelRequest::Index(12)));
        assert!(entry.is_empty());
    }

    #[test]
    fn unknown_keys_are_no_ops() {
        let mut entry = String::new();
        let ConsoleInput::Input(input) = decode_key(KeyCode::Char('x'), &mut entry) else {
            panic!("expected an input");
        };

        assert_eq!(input, Input::NoOp);
    }
}
