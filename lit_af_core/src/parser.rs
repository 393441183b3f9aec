use crate::card::Card;
use crate::error::ParseError;
use crate::state::{Move, Seat};

/// 把玩家输入的文本解析成招法
///
/// - `ask <座位> <牌>`，例如 `ask 3 QH`
/// - `claim <座位>:<牌>,<牌>... [<座位>:<牌>...]`，例如 `claim 0:2S,3S,4S 2:5S,6S,7S`
///
/// 只做语法检查，合法性交给引擎判断。
pub fn parse_move(raw: &str) -> Result<Move, ParseError> {
    let mut tokens = raw.split_whitespace();
    let verb = tokens.next().ok_or(ParseError::Empty)?;
    let args: Vec<&str> = tokens.collect();

    match verb.to_ascii_lowercase().as_str() {
        "ask" => {
            let [target, card] = args.as_slice() else {
                return Err(ParseError::Malformed("usage: ask <player> <card>".to_string()));
            };
            Ok(Move::Ask {
                target: parse_seat(target)?,
                card: card.parse()?,
            })
        }
        "claim" => {
            if args.is_empty() {
                return Err(ParseError::Malformed(
                    "usage: claim <player>:<card>,<card> [<player>:<card>...]".to_string(),
                ));
            }
            let mut assignments = Vec::new();
            for group in args {
                let (seat, cards) = group
                    .split_once(':')
                    .ok_or_else(|| ParseError::Malformed(format!("expected <player>:<cards>, got '{}'", group)))?;
                let seat = parse_seat(seat)?;
                for card in cards.split(',').filter(|c| !c.is_empty()) {
                    assignments.push((seat, card.parse::<Card>()?));
                }
            }
            Ok(Move::Claim { assignments })
        }
        _ => Err(ParseError::UnknownVerb(verb.to_string())),
    }
}

fn parse_seat(s: &str) -> Result<Seat, ParseError> {
    s.parse().map_err(|_| ParseError::InvalidPlayer(s.to_string()))
}
