//! Transition diff parser
//!
//! One sample is a line of `<from>-<weight>-<to>;` tokens. The weight is
//! validated but dropped; only edge presence is kept.
//!
//! ```text
//! "a-1-b;b-0.5-c;"  ──tokenize──►  {(a,b), (b,c)}  ──encode──►  S
//! add    = S \ previous
//! remove = previous \ S
//! ```

use tracing::trace;

use crate::domain::{EdgeIndexCodec, EdgeSet, NetworkTransition, NodeLookup};
use crate::errors::ParseError;

/// One `from-weight-to` edge token
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeToken<'a> {
    pub from: &'a str,
    pub weight: f64,
    pub to: &'a str,
}

/// Split a sample into edge tokens
///
/// Only `;`-terminated tokens count; text after the last `;` is ignored, as
/// are empty tokens.
pub fn tokenize(sample: &str) -> Result<Vec<EdgeToken<'_>>, ParseError> {
    let mut pieces: Vec<&str> = sample.split(';').collect();
    if let Some(tail) = pieces.pop() {
        if !tail.trim().is_empty() {
            trace!("ignoring unterminated edge token '{}'", tail.trim());
        }
    }

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> Result<EdgeToken<'_>, ParseError> {
    let fields: Vec<&str> = token.split('-').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(ParseError::malformed(
            token,
            format!("expected 3 '-' separated fields, found {}", fields.len()),
        ));
    }
    if fields[0].is_empty() || fields[2].is_empty() {
        return Err(ParseError::malformed(token, "empty node label"));
    }

    let weight: f64 = fields[1]
        .parse()
        .map_err(|_| ParseError::malformed(token, format!("weight '{}' is not a number", fields[1])))?;

    Ok(EdgeToken {
        from: fields[0],
        weight,
        to: fields[2],
    })
}

/// Parse one sample into its edge set
pub fn parse_edges<L: NodeLookup + ?Sized>(
    sample: &str,
    lookup: &L,
    codec: &EdgeIndexCodec,
) -> Result<EdgeSet, ParseError> {
    let mut edges = EdgeSet::default();
    for token in tokenize(sample)? {
        let source = lookup.label_to_index(token.from)?;
        let target = lookup.label_to_index(token.to)?;
        edges.insert(codec.encode(source, target));
    }
    Ok(edges)
}

/// Parse one sample against the previous cumulative edge set
///
/// Returns the diff and the new cumulative set (the sample's own edge set).
/// Pure: neither `lookup` nor `previous` is modified.
pub fn parse_sample<L: NodeLookup + ?Sized>(
    sample: &str,
    lookup: &L,
    previous: &EdgeSet,
) -> Result<(NetworkTransition, EdgeSet), ParseError> {
    let codec = lookup.codec();
    let current = parse_edges(sample, lookup, &codec)?;
    let transition = NetworkTransition::between(previous, &current);
    Ok((transition, current))
}
