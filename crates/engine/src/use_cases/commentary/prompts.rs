//! Prompt assembly for play commentary.
//!
//! Each mode has a fixed instruction block (sent as the system prompt) and a
//! context block built from the play's fields (sent as the user message).

use playcast_domain::{CommentaryMode, PlayFieldError, PlayRecord};

const TECHNICAL_INSTRUCTIONS: &str = "\
You are a baseball analyst summarizing the game for technical fans. \
Cover the pitch type, strategic considerations, the batter-pitcher matchup \
and how the game situation shapes decision-making. Use advanced terminology \
to break down the pitch sequence, expected outcomes and strategic intent. \
Keep the response to one short paragraph.";

const CASUAL_INSTRUCTIONS: &str = "\
You are a baseball commentator calling the action play by play for casual \
fans. Explain what happened in simple, engaging terms: the action, the \
players involved and the strategy. Say why the play matters in the game and \
make it exciting. Keep the response to one short paragraph.";

const PUTOUT_FIELDS: [&str; 10] = [
    "po0", "po1", "po2", "po3", "po4", "po5", "po6", "po7", "po8", "po9",
];
const ASSIST_FIELDS: [&str; 9] = ["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "a9"];
const ERROR_FIELDS: [&str; 9] = ["e1", "e2", "e3", "e4", "e5", "e6", "e7", "e8", "e9"];
const HIT_FIELDS: [&str; 4] = ["single", "double", "triple", "hr"];

/// A prompt ready to send to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayPrompt {
    pub instructions: &'static str,
    pub context: String,
}

/// Build the prompt for `play` in the given mode.
pub fn build_prompt(
    play: &PlayRecord,
    mode: CommentaryMode,
    batter: &str,
    pitcher: &str,
) -> Result<PlayPrompt, PlayFieldError> {
    match mode {
        CommentaryMode::Technical => Ok(PlayPrompt {
            instructions: TECHNICAL_INSTRUCTIONS,
            context: technical_context(play, batter, pitcher)?,
        }),
        CommentaryMode::Casual => Ok(PlayPrompt {
            instructions: CASUAL_INSTRUCTIONS,
            context: casual_context(play, batter, pitcher)?,
        }),
    }
}

fn technical_context(play: &PlayRecord, batter: &str, pitcher: &str) -> Result<String, PlayFieldError> {
    Ok(format!(
        "Play: {event}\n\
         Context:\n\
         Batter Stats:\n\
         \x20   Batter - {batter},\n\
         \x20   Bat Hand - {bathand},\n\
         \x20   Plate Appearances - {pa},\n\
         \x20   At-Bats - {ab},\n\
         \x20   Hits - {hits},\n\
         \x20   Home Runs - {hr},\n\
         \x20   RBIs - {rbi},\n\
         \x20   Walks - {walk},\n\
         Pitcher Stats:\n\
         \x20   Pitcher - {pitcher},\n\
         \x20   Pitch Hand - {pithand},\n\
         \x20   Pitch - {pitches},\n\
         \x20   Number of Pitches - {nump},\n\
         \x20   Strikeouts - {k},\n\
         \x20   Earned Runs - {er},\n\
         \x20   Wild Pitches - {wp},\n\
         \x20   Loss Indicator - {lp},\n\
         Fielding Stats:\n\
         \x20   Outs Before Play - {outs_pre},\n\
         \x20   Outs After Play - {outs_post},\n\
         \x20   Putouts by Fielders - {putouts},\n\
         \x20   Assists by Fielders - {assists},\n\
         \x20   Errors - {errors},\n\
         \x20   Grounded into Double Play - {gdp},\n\
         \x20   Triple Play - {tp},\n\
         \x20   Ball in Play Indicator - {bip}",
        event = play.display("event")?,
        bathand = play.display("bathand")?,
        pa = play.int("pa")?,
        ab = play.int("ab")?,
        hits = play.sum(&HIT_FIELDS)?,
        hr = play.int("hr")?,
        rbi = play.int("rbi")?,
        walk = play.int("walk")?,
        pithand = play.display("pithand")?,
        pitches = play.display("pitches")?,
        nump = play.int("nump")?,
        k = play.int("k")?,
        er = play.int("er")?,
        wp = play.int("wp")?,
        lp = play.display("lp")?,
        outs_pre = play.int("outs_pre")?,
        outs_post = play.int("outs_post")?,
        putouts = play.sum(&PUTOUT_FIELDS)?,
        assists = play.sum(&ASSIST_FIELDS)?,
        errors = play.sum(&ERROR_FIELDS)?,
        gdp = play.display("gdp")?,
        tp = play.display("tp")?,
        bip = play.display("bip")?,
    ))
}

fn casual_context(play: &PlayRecord, batter: &str, pitcher: &str) -> Result<String, PlayFieldError> {
    let outs_made = play.difference("outs_post", "outs_pre")?;
    let double_play = if play.flag("gdp")? { "Yes" } else { "No" };

    Ok(format!(
        "Play: {event}\n\
         Context:\n\
         Batter:\n\
         \x20   Name - {batter},\n\
         \x20   Hits - {hits},\n\
         \x20   Home Runs - {hr},\n\
         Pitcher:\n\
         \x20   Name - {pitcher},\n\
         \x20   Strikeouts - {k},\n\
         \x20   Earned Runs Allowed - {er},\n\
         Fielding:\n\
         \x20   Outs Made - {outs_made},\n\
         \x20   Errors on This Play - {errors},\n\
         \x20   Double Play Turned? - {double_play}\n\
         \x20   Bases - {bases}",
        event = play.display("event")?,
        hits = play.sum(&HIT_FIELDS)?,
        hr = play.int("hr")?,
        k = play.int("k")?,
        er = play.int("er")?,
        errors = play.sum(&ERROR_FIELDS[..4])?,
        bases = bases_state(play)?,
    ))
}

/// Occupied bases before the play, or "Bases empty".
fn bases_state(play: &PlayRecord) -> Result<String, PlayFieldError> {
    let mut runners = Vec::new();
    for (field, label) in [
        ("br1_pre", "Runner on first"),
        ("br2_pre", "Runner on second"),
        ("br3_pre", "Runner on third"),
    ] {
        if play.flag(field)? {
            runners.push(label);
        }
    }

    if runners.is_empty() {
        Ok("Bases empty".to_string())
    } else {
        Ok(runners.join(", "))
    }
}
