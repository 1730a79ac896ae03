use anyhow::{bail, Context, Result};
use bsp_buttons::{Millis, NUM_BUTTONS};

/// Extra simulated time after the last action when the script has no `end`.
const SETTLE_TIME: Millis = 2000;

/// What happens to a button at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Bouncy press; the button stays closed afterwards.
    Press,
    /// Bouncy release; the button stays open afterwards.
    Release,
    /// Raw bits fed to the button, LSB first.
    Noise(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub at: Millis,
    pub button: usize,
    pub kind: ActionKind,
}

/// A parsed simulation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub actions: Vec<Action>,
    pub end: Millis,
}

/// Parse a simulation script.
///
/// One action per line, times in milliseconds, non-decreasing:
/// - `@<ms> press <button>`
/// - `@<ms> release <button>`
/// - `@<ms> noise <button> 0x<bits>`
/// - `@<ms> end`
///
/// Blank lines and lines starting with `#` are ignored.
pub fn parse_script(input: &str) -> Result<Script> {
    let mut actions: Vec<Action> = Vec::new();
    let mut end: Option<Millis> = None;
    let mut last_at: Millis = 0;
    let mut last_line = 0;

    for (line_num, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if end.is_some() {
            bail!("line {}: action after end", line_num + 1);
        }

        let mut words = line.split_whitespace();
        let Some(stamp) = words.next().and_then(|w| w.strip_prefix('@')) else {
            bail!("line {}: missing time stamp '@<ms>'", line_num + 1);
        };
        let at: Millis = stamp
            .parse()
            .with_context(|| format!("line {}: invalid time '{}'", line_num + 1, stamp))?;
        if at < last_at {
            bail!(
                "line {}: time {} ms goes backwards (previous {} ms)",
                line_num + 1,
                at,
                last_at
            );
        }
        last_at = at;
        last_line = line_num + 1;

        let verb = words.next().unwrap_or_default();
        if verb == "end" {
            end = Some(at);
            continue;
        }

        let button = parse_button(words.next())
            .with_context(|| format!("line {}: bad button", line_num + 1))?;
        let kind = match verb {
            "press" => ActionKind::Press,
            "release" => ActionKind::Release,
            "noise" => {
                let bits = words.next().unwrap_or_default();
                let bits = bits.strip_prefix("0x").unwrap_or(bits);
                let bits = u64::from_str_radix(bits, 16)
                    .with_context(|| format!("line {}: invalid noise bits", line_num + 1))?;
                ActionKind::Noise(bits)
            }
            other => bail!("line {}: unknown action '{}'", line_num + 1, other),
        };

        if let Some(extra) = words.next() {
            bail!("line {}: unexpected '{}'", line_num + 1, extra);
        }

        actions.push(Action { at, button, kind });
    }

    let end = match end {
        Some(end) => end,
        None => match last_at.checked_add(SETTLE_TIME) {
            Some(end) => end,
            None => bail!(
                "line {}: no room for {} ms settle time after {} ms; add an explicit end",
                last_line,
                SETTLE_TIME,
                last_at
            ),
        },
    };
    Ok(Script { actions, end })
}

fn parse_button(word: Option<&str>) -> Result<usize> {
    let Some(word) = word else {
        bail!("missing button number");
    };
    let button: usize = word
        .parse()
        .with_context(|| format!("invalid button '{}'", word))?;
    if button >= NUM_BUTTONS {
        bail!("button {} out of range (0..{})", button, NUM_BUTTONS);
    }
    Ok(button)
}
