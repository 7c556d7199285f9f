//! Peer discovery
//!
//! Asks the completion model for three competitor tickers and parses the
//! answer as a literal list such as `['MSFT', 'GOOGL', 'META']`. The answer
//! is untrusted text, so it goes through a small grammar-limited parser; any
//! malformed answer yields [`FALLBACK_PEERS`] instead of an error.

use crate::error::Result;
use crate::metrics::{PEER_COUNT, PeerSet};
use crate::prompts;
use research_llm::TextCompletion;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Broad-market ETFs used when the model's answer cannot be parsed
pub const FALLBACK_PEERS: [&str; PEER_COUNT] = ["SPY", "QQQ", "DIA"];

/// Competitor lookup backed by a text completion model
#[derive(Clone)]
pub struct PeerDiscovery {
    completion: Arc<dyn TextCompletion>,
}

impl PeerDiscovery {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    /// Discover exactly three peers for `symbol`
    ///
    /// Parse failures fall back to [`FALLBACK_PEERS`]. Completion failures
    /// are returned to the caller. Duplicates and the queried symbol itself
    /// are kept as the model returned them.
    #[instrument(skip(self))]
    pub async fn discover(&self, symbol: &str) -> Result<PeerSet> {
        let prompt = prompts::peer_discovery_prompt(symbol)?;
        let response = self.completion.complete(&prompt).await?;

        let peers = parse_peers(&response).unwrap_or_else(|| {
            warn!("Could not parse peers for {}, using fallback", symbol);
            fallback_peers()
        });
        info!("Peers for {}: {}", symbol, peers.join(", "));

        Ok(PeerSet::new(symbol, peers))
    }
}

/// The fallback peer list as owned strings
pub fn fallback_peers() -> [String; PEER_COUNT] {
    FALLBACK_PEERS.map(str::to_string)
}

/// Parse a completion into exactly three uppercased symbols
///
/// Returns `None` unless the whole text is a list literal of exactly three
/// quoted strings.
pub fn parse_peers(text: &str) -> Option<[String; PEER_COUNT]> {
    let items = parse_string_list(text)?;
    let items: Vec<String> = items.into_iter().map(|s| s.to_uppercase()).collect();
    items.try_into().ok()
}

/// Parse `['a', "b", ...]` with optional trailing comma and surrounding
/// whitespace; nothing else is accepted
fn parse_string_list(text: &str) -> Option<Vec<String>> {
    let mut chars = text.trim().chars().peekable();
    let mut items = Vec::new();

    expect(&mut chars, '[')?;
    loop {
        skip_whitespace(&mut chars);
        match chars.peek()? {
            ']' => {
                chars.next();
                break;
            }
            '\'' | '"' => items.push(parse_quoted(&mut chars)?),
            _ => return None,
        }

        skip_whitespace(&mut chars);
        match chars.next()? {
            ',' => {}
            ']' => break,
            _ => return None,
        }
    }

    chars.next().is_none().then_some(items)
}

fn parse_quoted(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let quote = chars.next()?;
    let mut value = String::new();

    loop {
        match chars.next()? {
            c if c == quote => return Some(value),
            '\\' => value.push(chars.next()?),
            '\n' => return None,
            c => value.push(c),
        }
    }
}

fn expect(chars: &mut Peekable<Chars<'_>>, expected: char) -> Option<()> {
    (chars.next()? == expected).then_some(())
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}
