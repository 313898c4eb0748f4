use crate::core::ast::{Node, NodeKind};
use crate::core::token::{Token, TokenData, tokenize};
use crate::{JSError, raise_parse_error};

/// Parse a complete program with the built-in front end, producing the same
/// ESTree-shaped tree that `evaluate_node` accepts from a parser callback.
pub fn parse_program(source: &str) -> Result<Node, JSError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        source_len: source.len(),
    };
    parser.program()
}

struct Parser {
    tokens: Vec<TokenData>,
    pos: usize,
    source_len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    fn peek_is(&self, t: &Token) -> bool {
        self.peek() == Some(t)
    }

    fn newline_before_next(&self) -> bool {
        self.tokens.get(self.pos).map(|t| t.newline_before).unwrap_or(false)
    }

    fn advance(&mut self) -> Option<TokenData> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, t: &Token) -> bool {
        if self.peek_is(t) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, t: &Token) -> Result<(), JSError> {
        if self.eat(t) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected {t:?}")))
        }
    }

    fn unexpected(&self, what: &str) -> JSError {
        match self.tokens.get(self.pos) {
            Some(td) => raise_parse_error!("{what}, found {:?} at offset {}", td.token, td.start),
            None => raise_parse_error!("{what}, found end of input"),
        }
    }

    fn cur_start(&self) -> usize {
        self.tokens.get(self.pos).map(|t| t.start).unwrap_or(self.source_len)
    }

    fn prev_end(&self) -> usize {
        if self.pos > 0 { self.tokens[self.pos - 1].end } else { 0 }
    }

    fn node(&self, start: usize, kind: NodeKind) -> Node {
        Node {
            start,
            end: self.prev_end(),
            kind,
        }
    }

    fn identifier(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        match self.advance() {
            Some(TokenData {
                token: Token::Identifier(name),
                ..
            }) => Ok(self.node(start, NodeKind::Identifier { name })),
            Some(td) => Err(raise_parse_error!("expected identifier, found {:?} at offset {}", td.token, td.start)),
            None => Err(raise_parse_error!("expected identifier, found end of input")),
        }
    }

    // Statement terminator: an explicit semicolon, a following `}`, the end
    // of input, or a line break before the next token.
    fn terminate(&mut self) -> Result<(), JSError> {
        if self.eat(&Token::Semicolon) {
            return Ok(());
        }
        match self.peek() {
            None | Some(Token::RBrace) => Ok(()),
            Some(_) if self.newline_before_next() => Ok(()),
            _ => Err(self.unexpected("expected ';'")),
        }
    }

    fn program(&mut self) -> Result<Node, JSError> {
        let mut body = Vec::new();
        while self.peek().is_some() {
            body.push(self.statement()?);
        }
        Ok(Node {
            start: 0,
            end: self.source_len,
            kind: NodeKind::Program { body },
        })
    }

    fn statement(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        match self.peek() {
            None => Err(raise_parse_error!("unexpected end of input")),
            Some(Token::LBrace) => self.block_statement(),
            Some(Token::Semicolon) => {
                self.pos += 1;
                Ok(self.node(start, NodeKind::EmptyStatement))
            }
            Some(Token::Var) => {
                let decl = self.variable_declaration(false)?;
                self.terminate()?;
                Ok(decl)
            }
            Some(Token::Function) => self.function_declaration(),
            Some(Token::If) => self.if_statement(),
            Some(Token::While) => self.while_statement(),
            Some(Token::Do) => self.do_while_statement(),
            Some(Token::For) => self.for_statement(),
            Some(Token::Switch) => self.switch_statement(),
            Some(Token::With) => self.with_statement(),
            Some(Token::Try) => self.try_statement(),
            Some(Token::Throw) => self.throw_statement(),
            Some(Token::Return) => self.return_statement(),
            Some(Token::Break) => self.break_or_continue(true),
            Some(Token::Continue) => self.break_or_continue(false),
            Some(Token::Identifier(_)) if self.peek_at(1) == Some(&Token::Colon) => {
                let label = self.identifier()?;
                self.expect(&Token::Colon)?;
                let body = self.statement()?;
                Ok(self.node(
                    start,
                    NodeKind::LabeledStatement {
                        label: Box::new(label),
                        body: Box::new(body),
                    },
                ))
            }
            _ => {
                let expression = self.expression(false)?;
                self.terminate()?;
                Ok(self.node(
                    start,
                    NodeKind::ExpressionStatement {
                        expression: Box::new(expression),
                    },
                ))
            }
        }
    }

    fn block_statement(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::LBrace)?;
        let mut body = Vec::new();
        while !self.peek_is(&Token::RBrace) {
            if self.peek().is_none() {
                return Err(raise_parse_error!("unterminated block"));
            }
            body.push(self.statement()?);
        }
        self.expect(&Token::RBrace)?;
        Ok(self.node(start, NodeKind::BlockStatement { body }))
    }

    fn variable_declaration(&mut self, no_in: bool) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::Var)?;
        let mut declarations = Vec::new();
        loop {
            let decl_start = self.cur_start();
            let id = self.identifier()?;
            let init = if self.eat(&Token::Assign) {
                Some(Box::new(self.assignment_expr(no_in)?))
            } else {
                None
            };
            declarations.push(self.node(
                decl_start,
                NodeKind::VariableDeclarator {
                    id: Box::new(id),
                    init,
                },
            ));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(self.node(
            start,
            NodeKind::VariableDeclaration {
                declarations,
                kind: "var".to_string(),
            },
        ))
    }

    fn function_declaration(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::Function)?;
        let id = self.identifier()?;
        let (params, body) = self.function_rest()?;
        Ok(self.node(
            start,
            NodeKind::FunctionDeclaration {
                id: Box::new(id),
                params,
                body: Box::new(body),
            },
        ))
    }

    fn function_rest(&mut self) -> Result<(Vec<Node>, Node), JSError> {
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        if !self.peek_is(&Token::RParen) {
            loop {
                params.push(self.identifier()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RParen)?;
        let body = self.block_statement()?;
        Ok((params, body))
    }

    fn if_statement(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::If)?;
        self.expect(&Token::LParen)?;
        let test = self.expression(false)?;
        self.expect(&Token::RParen)?;
        let consequent = self.statement()?;
        let alternate = if self.eat(&Token::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(self.node(
            start,
            NodeKind::IfStatement {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate,
            },
        ))
    }

    fn while_statement(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::While)?;
        self.expect(&Token::LParen)?;
        let test = self.expression(false)?;
        self.expect(&Token::RParen)?;
        let body = self.statement()?;
        Ok(self.node(
            start,
            NodeKind::WhileStatement {
                test: Box::new(test),
                body: Box::new(body),
            },
        ))
    }

    fn do_while_statement(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::Do)?;
        let body = self.statement()?;
        self.expect(&Token::While)?;
        self.expect(&Token::LParen)?;
        let test = self.expression(false)?;
        self.expect(&Token::RParen)?;
        // the trailing semicolon is optional here, even mid-line
        self.eat(&Token::Semicolon);
        Ok(self.node(
            start,
            NodeKind::DoWhileStatement {
                body: Box::new(body),
                test: Box::new(test),
            },
        ))
    }

    fn for_statement(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::For)?;
        self.expect(&Token::LParen)?;

        let init: Option<Box<Node>> = if self.peek_is(&Token::Semicolon) {
            None
        } else if self.peek_is(&Token::Var) {
            let decl = self.variable_declaration(true)?;
            if self.eat(&Token::In) {
                return self.for_in_rest(start, decl);
            }
            Some(Box::new(decl))
        } else {
            let expr = self.expression(true)?;
            if self.eat(&Token::In) {
                return self.for_in_rest(start, expr);
            }
            Some(Box::new(expr))
        };

        self.expect(&Token::Semicolon)?;
        let test = if self.peek_is(&Token::Semicolon) {
            None
        } else {
            Some(Box::new(self.expression(false)?))
        };
        self.expect(&Token::Semicolon)?;
        let update = if self.peek_is(&Token::RParen) {
            None
        } else {
            Some(Box::new(self.expression(false)?))
        };
        self.expect(&Token::RParen)?;
        let body = self.statement()?;
        Ok(self.node(
            start,
            NodeKind::ForStatement {
                init,
                test,
                update,
                body: Box::new(body),
            },
        ))
    }

    fn for_in_rest(&mut self, start: usize, left: Node) -> Result<Node, JSError> {
        let right = self.expression(false)?;
        self.expect(&Token::RParen)?;
        let body = self.statement()?;
        Ok(self.node(
            start,
            NodeKind::ForInStatement {
                left: Box::new(left),
                right: Box::new(right),
                body: Box::new(body),
            },
        ))
    }

    fn switch_statement(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::Switch)?;
        self.expect(&Token::LParen)?;
        let discriminant = self.expression(false)?;
        self.expect(&Token::RParen)?;
        self.expect(&Token::LBrace)?;
        let mut cases = Vec::new();
        while !self.peek_is(&Token::RBrace) {
            let case_start = self.cur_start();
            let test = if self.eat(&Token::Case) {
                let t = self.expression(false)?;
                Some(Box::new(t))
            } else if self.eat(&Token::Default) {
                None
            } else {
                return Err(self.unexpected("expected 'case' or 'default'"));
            };
            self.expect(&Token::Colon)?;
            let mut consequent = Vec::new();
            while !matches!(self.peek(), None | Some(Token::Case) | Some(Token::Default) | Some(Token::RBrace)) {
                consequent.push(self.statement()?);
            }
            cases.push(self.node(case_start, NodeKind::SwitchCase { test, consequent }));
        }
        self.expect(&Token::RBrace)?;
        Ok(self.node(
            start,
            NodeKind::SwitchStatement {
                discriminant: Box::new(discriminant),
                cases,
            },
        ))
    }

    fn with_statement(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::With)?;
        self.expect(&Token::LParen)?;
        let object = self.expression(false)?;
        self.expect(&Token::RParen)?;
        let body = self.statement()?;
        Ok(self.node(
            start,
            NodeKind::WithStatement {
                object: Box::new(object),
                body: Box::new(body),
            },
        ))
    }

    fn try_statement(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::Try)?;
        let block = self.block_statement()?;
        let handler = if self.peek_is(&Token::Catch) {
            let catch_start = self.cur_start();
            self.pos += 1;
            self.expect(&Token::LParen)?;
            let param = self.identifier()?;
            self.expect(&Token::RParen)?;
            let body = self.block_statement()?;
            Some(Box::new(self.node(
                catch_start,
                NodeKind::CatchClause {
                    param: Box::new(param),
                    body: Box::new(body),
                },
            )))
        } else {
            None
        };
        let finalizer = if self.eat(&Token::Finally) {
            Some(Box::new(self.block_statement()?))
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(raise_parse_error!("missing catch or finally after try"));
        }
        Ok(self.node(
            start,
            NodeKind::TryStatement {
                block: Box::new(block),
                handler,
                finalizer,
            },
        ))
    }

    fn throw_statement(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::Throw)?;
        if self.newline_before_next() {
            return Err(raise_parse_error!("illegal newline after 'throw' at offset {start}"));
        }
        let argument = self.expression(false)?;
        self.terminate()?;
        Ok(self.node(
            start,
            NodeKind::ThrowStatement {
                argument: Box::new(argument),
            },
        ))
    }

    fn return_statement(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::Return)?;
        let argument = if matches!(self.peek(), None | Some(Token::Semicolon) | Some(Token::RBrace)) || self.newline_before_next()
        {
            None
        } else {
            Some(Box::new(self.expression(false)?))
        };
        self.terminate()?;
        Ok(self.node(start, NodeKind::ReturnStatement { argument }))
    }

    fn break_or_continue(&mut self, is_break: bool) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.pos += 1;
        let label = if !self.newline_before_next() && matches!(self.peek(), Some(Token::Identifier(_))) {
            Some(Box::new(self.identifier()?))
        } else {
            None
        };
        self.terminate()?;
        let kind = if is_break {
            NodeKind::BreakStatement { label }
        } else {
            NodeKind::ContinueStatement { label }
        };
        Ok(self.node(start, kind))
    }

    // ---- expressions ----

    fn expression(&mut self, no_in: bool) -> Result<Node, JSError> {
        let start = self.cur_start();
        let first = self.assignment_expr(no_in)?;
        if !self.peek_is(&Token::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(&Token::Comma) {
            expressions.push(self.assignment_expr(no_in)?);
        }
        Ok(self.node(start, NodeKind::SequenceExpression { expressions }))
    }

    fn assignment_expr(&mut self, no_in: bool) -> Result<Node, JSError> {
        let start = self.cur_start();
        let left = self.conditional_expr(no_in)?;
        let op = match self.peek() {
            Some(Token::Assign) => "=",
            Some(Token::PlusAssign) => "+=",
            Some(Token::MinusAssign) => "-=",
            Some(Token::StarAssign) => "*=",
            Some(Token::SlashAssign) => "/=",
            Some(Token::PercentAssign) => "%=",
            Some(Token::ShlAssign) => "<<=",
            Some(Token::ShrAssign) => ">>=",
            Some(Token::UShrAssign) => ">>>=",
            Some(Token::BitAndAssign) => "&=",
            Some(Token::BitXorAssign) => "^=",
            Some(Token::BitOrAssign) => "|=",
            _ => return Ok(left),
        };
        if !matches!(left.kind, NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. }) {
            return Err(raise_parse_error!("invalid assignment target at offset {}", left.start));
        }
        self.pos += 1;
        let right = self.assignment_expr(no_in)?;
        Ok(self.node(
            start,
            NodeKind::AssignmentExpression {
                operator: op.to_string(),
                left: Box::new(left),
                right: Box::new(right),
            },
        ))
    }

    fn conditional_expr(&mut self, no_in: bool) -> Result<Node, JSError> {
        let start = self.cur_start();
        let test = self.binary_expr(1, no_in)?;
        if !self.eat(&Token::Question) {
            return Ok(test);
        }
        let consequent = self.assignment_expr(false)?;
        self.expect(&Token::Colon)?;
        let alternate = self.assignment_expr(no_in)?;
        Ok(self.node(
            start,
            NodeKind::ConditionalExpression {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
        ))
    }

    fn binary_operator(&self, no_in: bool) -> Option<(&'static str, u8, bool)> {
        let entry = match self.peek()? {
            Token::OrOr => ("||", 1, true),
            Token::AndAnd => ("&&", 2, true),
            Token::BitOr => ("|", 3, false),
            Token::BitXor => ("^", 4, false),
            Token::BitAnd => ("&", 5, false),
            Token::Eq => ("==", 6, false),
            Token::Ne => ("!=", 6, false),
            Token::StrictEq => ("===", 6, false),
            Token::StrictNe => ("!==", 6, false),
            Token::Lt => ("<", 7, false),
            Token::Gt => (">", 7, false),
            Token::Le => ("<=", 7, false),
            Token::Ge => (">=", 7, false),
            Token::InstanceOf => ("instanceof", 7, false),
            Token::In if !no_in => ("in", 7, false),
            Token::Shl => ("<<", 8, false),
            Token::Shr => (">>", 8, false),
            Token::UShr => (">>>", 8, false),
            Token::Plus => ("+", 9, false),
            Token::Minus => ("-", 9, false),
            Token::Star => ("*", 10, false),
            Token::Slash => ("/", 10, false),
            Token::Percent => ("%", 10, false),
            _ => return None,
        };
        Some(entry)
    }

    fn binary_expr(&mut self, min_prec: u8, no_in: bool) -> Result<Node, JSError> {
        let start = self.cur_start();
        let mut left = self.unary_expr()?;
        while let Some((op, prec, logical)) = self.binary_operator(no_in) {
            if prec < min_prec {
                break;
            }
            self.pos += 1;
            let right = self.binary_expr(prec + 1, no_in)?;
            let kind = if logical {
                NodeKind::LogicalExpression {
                    operator: op.to_string(),
                    left: Box::new(left),
                    right: Box::new(right),
                }
            } else {
                NodeKind::BinaryExpression {
                    operator: op.to_string(),
                    left: Box::new(left),
                    right: Box::new(right),
                }
            };
            left = self.node(start, kind);
        }
        Ok(left)
    }

    fn unary_expr(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        let op = match self.peek() {
            Some(Token::Not) => Some("!"),
            Some(Token::BitNot) => Some("~"),
            Some(Token::Plus) => Some("+"),
            Some(Token::Minus) => Some("-"),
            Some(Token::TypeOf) => Some("typeof"),
            Some(Token::Void) => Some("void"),
            Some(Token::Delete) => Some("delete"),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let argument = self.unary_expr()?;
            return Ok(self.node(
                start,
                NodeKind::UnaryExpression {
                    operator: op.to_string(),
                    argument: Box::new(argument),
                },
            ));
        }
        if matches!(self.peek(), Some(Token::Inc) | Some(Token::Dec)) {
            let op = if self.peek_is(&Token::Inc) { "++" } else { "--" };
            self.pos += 1;
            let argument = self.unary_expr()?;
            return Ok(self.node(
                start,
                NodeKind::UpdateExpression {
                    operator: op.to_string(),
                    argument: Box::new(argument),
                    prefix: true,
                },
            ));
        }
        self.postfix_expr()
    }

    fn postfix_expr(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        let argument = self.call_expr()?;
        if matches!(self.peek(), Some(Token::Inc) | Some(Token::Dec)) && !self.newline_before_next() {
            let op = if self.peek_is(&Token::Inc) { "++" } else { "--" };
            self.pos += 1;
            return Ok(self.node(
                start,
                NodeKind::UpdateExpression {
                    operator: op.to_string(),
                    argument: Box::new(argument),
                    prefix: false,
                },
            ));
        }
        Ok(argument)
    }

    fn call_expr(&mut self) -> Result<Node, JSError> {
        let base = self.member_expr()?;
        self.member_tail(base, true)
    }

    fn member_expr(&mut self) -> Result<Node, JSError> {
        if self.peek_is(&Token::New) {
            let start = self.cur_start();
            self.pos += 1;
            let callee = self.member_expr()?;
            let arguments = if self.peek_is(&Token::LParen) {
                self.arguments()?
            } else {
                Vec::new()
            };
            let node = self.node(
                start,
                NodeKind::NewExpression {
                    callee: Box::new(callee),
                    arguments,
                },
            );
            return self.member_tail(node, false);
        }
        let primary = self.primary_expr()?;
        self.member_tail(primary, false)
    }

    fn member_tail(&mut self, mut node: Node, allow_call: bool) -> Result<Node, JSError> {
        let start = node.start;
        loop {
            if self.eat(&Token::Dot) {
                let property = self.identifier()?;
                node = self.node(
                    start,
                    NodeKind::MemberExpression {
                        object: Box::new(node),
                        property: Box::new(property),
                        computed: false,
                    },
                );
            } else if self.eat(&Token::LBracket) {
                let property = self.expression(false)?;
                self.expect(&Token::RBracket)?;
                node = self.node(
                    start,
                    NodeKind::MemberExpression {
                        object: Box::new(node),
                        property: Box::new(property),
                        computed: true,
                    },
                );
            } else if allow_call && self.peek_is(&Token::LParen) {
                let arguments = self.arguments()?;
                node = self.node(
                    start,
                    NodeKind::CallExpression {
                        callee: Box::new(node),
                        arguments,
                    },
                );
            } else {
                return Ok(node);
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Node>, JSError> {
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        if !self.peek_is(&Token::RParen) {
            loop {
                args.push(self.assignment_expr(false)?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RParen)?;
        Ok(args)
    }

    fn primary_expr(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(self.node(
                    start,
                    NodeKind::Literal {
                        value: serde_json::Value::from(n),
                        regex: None,
                    },
                ))
            }
            Some(Token::StringLit(s)) => {
                self.pos += 1;
                Ok(self.node(
                    start,
                    NodeKind::Literal {
                        value: serde_json::Value::from(s),
                        regex: None,
                    },
                ))
            }
            Some(Token::True) => {
                self.pos += 1;
                Ok(self.node(
                    start,
                    NodeKind::Literal {
                        value: serde_json::Value::Bool(true),
                        regex: None,
                    },
                ))
            }
            Some(Token::False) => {
                self.pos += 1;
                Ok(self.node(
                    start,
                    NodeKind::Literal {
                        value: serde_json::Value::Bool(false),
                        regex: None,
                    },
                ))
            }
            Some(Token::Null) => {
                self.pos += 1;
                Ok(self.node(
                    start,
                    NodeKind::Literal {
                        value: serde_json::Value::Null,
                        regex: None,
                    },
                ))
            }
            Some(Token::This) => {
                self.pos += 1;
                Ok(self.node(start, NodeKind::ThisExpression))
            }
            Some(Token::Identifier(_)) => self.identifier(),
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expression(false)?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::LBracket) => self.array_literal(),
            Some(Token::LBrace) => self.object_literal(),
            Some(Token::Function) => self.function_expression(),
            Some(tok) => Err(raise_parse_error!("unexpected token {tok:?} at offset {start}")),
            None => Err(raise_parse_error!("unexpected end of input")),
        }
    }

    fn function_expression(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::Function)?;
        let id = if matches!(self.peek(), Some(Token::Identifier(_))) {
            Some(Box::new(self.identifier()?))
        } else {
            None
        };
        let (params, body) = self.function_rest()?;
        Ok(self.node(
            start,
            NodeKind::FunctionExpression {
                id,
                params,
                body: Box::new(body),
            },
        ))
    }

    fn array_literal(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::LBracket)?;
        let mut elements = Vec::new();
        loop {
            if self.eat(&Token::RBracket) {
                break;
            }
            if self.eat(&Token::Comma) {
                elements.push(None);
                continue;
            }
            elements.push(Some(self.assignment_expr(false)?));
            if !self.peek_is(&Token::RBracket) {
                self.expect(&Token::Comma)?;
                // a trailing comma before `]` is an elision-free terminator
                if self.eat(&Token::RBracket) {
                    break;
                }
            }
        }
        Ok(self.node(start, NodeKind::ArrayExpression { elements }))
    }

    fn object_literal(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        self.expect(&Token::LBrace)?;
        let mut properties = Vec::new();
        while !self.eat(&Token::RBrace) {
            properties.push(self.object_property()?);
            if !self.peek_is(&Token::RBrace) {
                self.expect(&Token::Comma)?;
            }
        }
        Ok(self.node(start, NodeKind::ObjectExpression { properties }))
    }

    fn object_property(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();

        // `get name() {...}` / `set name(v) {...}` accessors; a plain key that
        // happens to be called `get`/`set` is followed by `:` instead.
        if let Some(Token::Identifier(word)) = self.peek()
            && (word == "get" || word == "set")
            && matches!(
                self.peek_at(1),
                Some(Token::Identifier(_)) | Some(Token::StringLit(_)) | Some(Token::Number(_))
            )
        {
            let kind = word.clone();
            self.pos += 1;
            let key = self.property_key()?;
            let fn_start = self.cur_start();
            let (params, body) = self.function_rest()?;
            if kind == "get" && !params.is_empty() {
                return Err(raise_parse_error!("getter must have no parameters at offset {fn_start}"));
            }
            if kind == "set" && params.len() != 1 {
                return Err(raise_parse_error!("setter must have exactly one parameter at offset {fn_start}"));
            }
            let value = self.node(
                fn_start,
                NodeKind::FunctionExpression {
                    id: None,
                    params,
                    body: Box::new(body),
                },
            );
            return Ok(self.node(
                start,
                NodeKind::Property {
                    key: Box::new(key),
                    value: Box::new(value),
                    kind,
                },
            ));
        }

        let key = self.property_key()?;
        self.expect(&Token::Colon)?;
        let value = self.assignment_expr(false)?;
        Ok(self.node(
            start,
            NodeKind::Property {
                key: Box::new(key),
                value: Box::new(value),
                kind: "init".to_string(),
            },
        ))
    }

    fn property_key(&mut self) -> Result<Node, JSError> {
        let start = self.cur_start();
        match self.peek().cloned() {
            Some(Token::Identifier(_)) => self.identifier(),
            Some(Token::StringLit(s)) => {
                self.pos += 1;
                Ok(self.node(
                    start,
                    NodeKind::Literal {
                        value: serde_json::Value::from(s),
                        regex: None,
                    },
                ))
            }
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(self.node(
                    start,
                    NodeKind::Literal {
                        value: serde_json::Value::from(n),
                        regex: None,
                    },
                ))
            }
            _ => Err(self.unexpected("expected property key")),
        }
    }
}
