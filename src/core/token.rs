use crate::{JSError, raise_parse_error};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    StringLit(String),
    Identifier(String),
    // keywords
    Var,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Throw,
    Try,
    Catch,
    Finally,
    New,
    Delete,
    TypeOf,
    InstanceOf,
    In,
    Void,
    This,
    With,
    Null,
    True,
    False,
    // punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Colon,
    Dot,
    Question,
    // operators
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    ShlAssign,
    ShrAssign,
    UShrAssign,
    BitAndAssign,
    BitXorAssign,
    BitOrAssign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Inc,
    Dec,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Gt,
    Le,
    Ge,
    AndAnd,
    OrOr,
    Not,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Shl,
    Shr,
    UShr,
}

#[derive(Clone, Debug)]
pub struct TokenData {
    pub token: Token,
    pub start: usize,
    pub end: usize,
    /// A line terminator appeared between the previous token and this one.
    /// Drives semicolon insertion and the restricted productions
    /// (`return`/`throw`/`break`/`continue`, postfix `++`/`--`).
    pub newline_before: bool,
}

fn keyword(word: &str) -> Option<Token> {
    let tok = match word {
        "var" => Token::Var,
        "function" => Token::Function,
        "return" => Token::Return,
        "if" => Token::If,
        "else" => Token::Else,
        "for" => Token::For,
        "while" => Token::While,
        "do" => Token::Do,
        "switch" => Token::Switch,
        "case" => Token::Case,
        "default" => Token::Default,
        "break" => Token::Break,
        "continue" => Token::Continue,
        "throw" => Token::Throw,
        "try" => Token::Try,
        "catch" => Token::Catch,
        "finally" => Token::Finally,
        "new" => Token::New,
        "delete" => Token::Delete,
        "typeof" => Token::TypeOf,
        "instanceof" => Token::InstanceOf,
        "in" => Token::In,
        "void" => Token::Void,
        "this" => Token::This,
        "with" => Token::With,
        "null" => Token::Null,
        "true" => Token::True,
        "false" => Token::False,
        _ => return None,
    };
    Some(tok)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Multi-character punctuators, longest first so maximal munch wins.
const PUNCTUATORS: &[(&str, Token)] = &[
    (">>>=", Token::UShrAssign),
    ("===", Token::StrictEq),
    ("!==", Token::StrictNe),
    (">>>", Token::UShr),
    ("<<=", Token::ShlAssign),
    (">>=", Token::ShrAssign),
    ("==", Token::Eq),
    ("!=", Token::Ne),
    ("<=", Token::Le),
    (">=", Token::Ge),
    ("&&", Token::AndAnd),
    ("||", Token::OrOr),
    ("++", Token::Inc),
    ("--", Token::Dec),
    ("+=", Token::PlusAssign),
    ("-=", Token::MinusAssign),
    ("*=", Token::StarAssign),
    ("/=", Token::SlashAssign),
    ("%=", Token::PercentAssign),
    ("&=", Token::BitAndAssign),
    ("^=", Token::BitXorAssign),
    ("|=", Token::BitOrAssign),
    ("<<", Token::Shl),
    (">>", Token::Shr),
    ("(", Token::LParen),
    (")", Token::RParen),
    ("{", Token::LBrace),
    ("}", Token::RBrace),
    ("[", Token::LBracket),
    ("]", Token::RBracket),
    (";", Token::Semicolon),
    (",", Token::Comma),
    (":", Token::Colon),
    (".", Token::Dot),
    ("?", Token::Question),
    ("=", Token::Assign),
    ("+", Token::Plus),
    ("-", Token::Minus),
    ("*", Token::Star),
    ("/", Token::Slash),
    ("%", Token::Percent),
    ("<", Token::Lt),
    (">", Token::Gt),
    ("!", Token::Not),
    ("&", Token::BitAnd),
    ("|", Token::BitOr),
    ("^", Token::BitXor),
    ("~", Token::BitNot),
];

pub fn tokenize(source: &str) -> Result<Vec<TokenData>, JSError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens: Vec<TokenData> = Vec::new();
    let mut i = 0;
    let mut newline_before = false;

    while i < chars.len() {
        let (pos, ch) = chars[i];

        if ch == '\n' || ch == '\r' {
            newline_before = true;
            i += 1;
            continue;
        }
        if ch.is_whitespace() {
            i += 1;
            continue;
        }

        // comments
        if ch == '/' && i + 1 < chars.len() {
            let next = chars[i + 1].1;
            if next == '/' {
                while i < chars.len() && chars[i].1 != '\n' {
                    i += 1;
                }
                continue;
            }
            if next == '*' {
                i += 2;
                let mut closed = false;
                while i + 1 < chars.len() {
                    if chars[i].1 == '\n' {
                        newline_before = true;
                    }
                    if chars[i].1 == '*' && chars[i + 1].1 == '/' {
                        i += 2;
                        closed = true;
                        break;
                    }
                    i += 1;
                }
                if !closed {
                    return Err(raise_parse_error!("unterminated block comment at offset {pos}"));
                }
                continue;
            }
        }

        // string literal
        if ch == '"' || ch == '\'' {
            let quote = ch;
            let start = pos;
            let mut out = String::new();
            i += 1;
            let mut terminated = false;
            while i < chars.len() {
                let (_, c) = chars[i];
                if c == quote {
                    i += 1;
                    terminated = true;
                    break;
                }
                if c == '\n' {
                    return Err(raise_parse_error!("unterminated string literal at offset {start}"));
                }
                if c == '\\' {
                    i += 1;
                    if i >= chars.len() {
                        return Err(raise_parse_error!("unterminated string literal at offset {start}"));
                    }
                    let (_, esc) = chars[i];
                    match esc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'b' => out.push('\u{0008}'),
                        'f' => out.push('\u{000C}'),
                        'v' => out.push('\u{000B}'),
                        '0' => out.push('\0'),
                        '\n' => {} // line continuation
                        'x' => {
                            let hex: String = chars[i + 1..].iter().take(2).map(|&(_, c)| c).collect();
                            let cp = u32::from_str_radix(&hex, 16)
                                .map_err(|_| raise_parse_error!("invalid \\x escape at offset {pos}"))?;
                            out.push(char::from_u32(cp).unwrap_or('\u{FFFD}'));
                            i += 2;
                        }
                        'u' => {
                            let hex: String = chars[i + 1..].iter().take(4).map(|&(_, c)| c).collect();
                            if hex.len() != 4 {
                                return Err(raise_parse_error!("invalid \\u escape at offset {pos}"));
                            }
                            let cp = u32::from_str_radix(&hex, 16)
                                .map_err(|_| raise_parse_error!("invalid \\u escape at offset {pos}"))?;
                            out.push(char::from_u32(cp).unwrap_or('\u{FFFD}'));
                            i += 4;
                        }
                        other => out.push(other),
                    }
                    i += 1;
                    continue;
                }
                out.push(c);
                i += 1;
            }
            if !terminated {
                return Err(raise_parse_error!("unterminated string literal at offset {start}"));
            }
            let end = chars.get(i).map(|&(p, _)| p).unwrap_or(source.len());
            tokens.push(TokenData {
                token: Token::StringLit(out),
                start,
                end,
                newline_before,
            });
            newline_before = false;
            continue;
        }

        // number literal
        if ch.is_ascii_digit() || (ch == '.' && i + 1 < chars.len() && chars[i + 1].1.is_ascii_digit()) {
            let start = pos;
            // hex
            if ch == '0' && i + 1 < chars.len() && (chars[i + 1].1 == 'x' || chars[i + 1].1 == 'X') {
                i += 2;
                let digits_start = i;
                while i < chars.len() && chars[i].1.is_ascii_hexdigit() {
                    i += 1;
                }
                if i == digits_start {
                    return Err(raise_parse_error!("missing hex digits at offset {start}"));
                }
                let digits: String = chars[digits_start..i].iter().map(|&(_, c)| c).collect();
                let n = u64::from_str_radix(&digits, 16)
                    .map_err(|_| raise_parse_error!("invalid hex literal at offset {start}"))?;
                let end = chars.get(i).map(|&(p, _)| p).unwrap_or(source.len());
                tokens.push(TokenData {
                    token: Token::Number(n as f64),
                    start,
                    end,
                    newline_before,
                });
                newline_before = false;
                continue;
            }
            while i < chars.len() && chars[i].1.is_ascii_digit() {
                i += 1;
            }
            if i < chars.len() && chars[i].1 == '.' {
                i += 1;
                while i < chars.len() && chars[i].1.is_ascii_digit() {
                    i += 1;
                }
            }
            if i < chars.len() && (chars[i].1 == 'e' || chars[i].1 == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j].1 == '+' || chars[j].1 == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].1.is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].1.is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let end = chars.get(i).map(|&(p, _)| p).unwrap_or(source.len());
            let text = &source[start..end];
            let n: f64 = text
                .parse()
                .map_err(|_| raise_parse_error!("invalid number literal '{text}' at offset {start}"))?;
            tokens.push(TokenData {
                token: Token::Number(n),
                start,
                end,
                newline_before,
            });
            newline_before = false;
            continue;
        }

        // identifier / keyword
        if is_ident_start(ch) {
            let start = pos;
            while i < chars.len() && is_ident_part(chars[i].1) {
                i += 1;
            }
            let end = chars.get(i).map(|&(p, _)| p).unwrap_or(source.len());
            let word = &source[start..end];
            let token = keyword(word).unwrap_or_else(|| Token::Identifier(word.to_string()));
            tokens.push(TokenData {
                token,
                start,
                end,
                newline_before,
            });
            newline_before = false;
            continue;
        }

        // punctuator, maximal munch
        let rest = &source[pos..];
        let mut matched = false;
        for (text, token) in PUNCTUATORS {
            if rest.starts_with(text) {
                tokens.push(TokenData {
                    token: token.clone(),
                    start: pos,
                    end: pos + text.len(),
                    newline_before,
                });
                newline_before = false;
                i += text.chars().count();
                matched = true;
                break;
            }
        }
        if !matched {
            return Err(raise_parse_error!("unexpected character '{ch}' at offset {pos}"));
        }
    }

    log::trace!("tokenized {} tokens from {} bytes", tokens.len(), source.len());
    Ok(tokens)
}
