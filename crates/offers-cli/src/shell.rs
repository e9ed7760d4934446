//! Interactive front end: one input line, search and random actions per
//! kind, an echo of the searched key, and two result columns.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use offers_core::{Classifier, OffersError, SearchKind, SearchReport, Searcher};
use rand::Rng;

/// Width of the OFFERS column
const OFFER_WIDTH: usize = 75;
/// Width of the SCORE column
const SCORE_WIDTH: usize = 7;

const HELP: &str = "\
Search for offers! Type in a retailer, brand, or category.
Use the 'random' commands to search for random offers!

  retailer <name>     search offers by retailer
  brand <name>        search offers by brand
  category <name>     search offers by product category
  random <kind>       search a random retailer, brand or category
  help                show this message
  quit                leave
";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Search(SearchKind, String),
    Random(SearchKind),
    Help,
    Quit,
}

impl Action {
    /// Parse a line; `Ok(None)` for blank lines.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let action = match command.to_lowercase().as_str() {
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "random" => Self::Random(rest.parse()?),
            other => match other.parse::<SearchKind>() {
                Ok(kind) => Self::Search(kind, rest.to_string()),
                Err(_) => {
                    return Err(format!(
                        "Unknown command: {}. Type 'help' for a list of commands.",
                        command
                    ));
                }
            },
        };
        Ok(Some(action))
    }
}

/// Print the key being searched.
pub fn render_echo<W: Write>(out: &mut W, key: &str) -> io::Result<()> {
    writeln!(out, "Input: {}", key)
}

pub fn render_warning<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "Warning: {}", message)
}

fn format_score(score: f32) -> String {
    format!("({:.2})", score)
}

/// Print the OFFERS and SCORE columns side by side.
pub fn render_report<W: Write>(out: &mut W, report: &SearchReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{:<ow$} {:^sw$}",
        "OFFERS",
        "SCORE",
        ow = OFFER_WIDTH,
        sw = SCORE_WIDTH
    )?;

    if report.matches.is_empty() {
        writeln!(out, "No offers found for this {}.", report.kind)?;
        if !report.suggestions.is_empty() {
            writeln!(out, "Try with similar categories: {}", report.suggestions.join(", "))?;
        }
        return Ok(());
    }

    for scored in &report.matches {
        writeln!(
            out,
            "{:<ow$} {:^sw$}",
            scored.offer,
            format_score(scored.score),
            ow = OFFER_WIDTH,
            sw = SCORE_WIDTH
        )?;
    }
    Ok(())
}

/// Render a search result, turning user-level errors into warnings.
///
/// Any other error is returned to the caller.
pub fn render_outcome<W: Write>(
    out: &mut W,
    outcome: offers_core::Result<SearchReport>,
) -> Result<()> {
    match outcome {
        Ok(report) => render_report(out, &report)?,
        Err(e) if e.is_warning() => render_warning(out, &e.to_string())?,
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Search by kind, echoing the normalized input first.
pub fn search<C: Classifier, W: Write>(
    searcher: &Searcher<C>,
    kind: SearchKind,
    query: &str,
    out: &mut W,
) -> Result<()> {
    render_echo(out, &kind.normalize(query))?;
    render_outcome(out, searcher.search(kind, query))
}

/// Search a random key of the given kind, echoing the key first.
pub fn random<C: Classifier, R: Rng + ?Sized, W: Write>(
    searcher: &Searcher<C>,
    kind: SearchKind,
    rng: &mut R,
    out: &mut W,
) -> Result<()> {
    match searcher.random_key(kind, rng) {
        Some(key) => {
            render_echo(out, key)?;
            render_outcome(out, searcher.search_exact(kind, key))
        }
        None => Err(OffersError::EmptyDataset(kind).into()),
    }
}

/// Line-oriented session over any reader and writer.
pub struct Shell<'a, C, R> {
    searcher: &'a Searcher<C>,
    rng: R,
}

impl<'a, C: Classifier, R: Rng> Shell<'a, C, R> {
    pub fn new(searcher: &'a Searcher<C>, rng: R) -> Self {
        Self { searcher, rng }
    }

    /// Read commands until `quit` or end of input.
    pub fn run<I: BufRead, W: Write>(&mut self, input: I, out: &mut W) -> Result<()> {
        out.write_all(HELP.as_bytes())?;
        prompt(out)?;

        for line in input.lines() {
            let line = line?;
            match Action::parse(&line) {
                Ok(Some(Action::Quit)) => break,
                Ok(Some(action)) => self.execute(action, out)?,
                Ok(None) => {}
                Err(message) => writeln!(out, "{}", message)?,
            }
            prompt(out)?;
        }

        writeln!(out)?;
        Ok(())
    }

    pub fn execute<W: Write>(&mut self, action: Action, out: &mut W) -> Result<()> {
        match action {
            Action::Search(kind, query) => search(self.searcher, kind, &query, out)?,
            Action::Random(kind) => random(self.searcher, kind, &mut self.rng, out)?,
            Action::Help => out.write_all(HELP.as_bytes())?,
            Action::Quit => {}
        }
        Ok(())
    }
}

fn prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\noffers> ")?;
    out.flush()
}
