use crate::{JSError, raise_parse_error};
use serde::Deserialize;

/// An ESTree-shaped AST node. `start`/`end` are byte offsets into the
/// original source; function nodes rely on them so `toString` can slice the
/// source text. When an AST arrives as JSON (e.g. from a parser callback),
/// missing offsets default to zero.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    #[serde(flatten)]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Program {
        body: Vec<Node>,
    },
    EmptyStatement,
    DebuggerStatement,
    ExpressionStatement {
        expression: Box<Node>,
    },
    BlockStatement {
        body: Vec<Node>,
    },
    IfStatement {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Option<Box<Node>>,
    },
    LabeledStatement {
        label: Box<Node>,
        body: Box<Node>,
    },
    BreakStatement {
        label: Option<Box<Node>>,
    },
    ContinueStatement {
        label: Option<Box<Node>>,
    },
    WithStatement {
        object: Box<Node>,
        body: Box<Node>,
    },
    SwitchStatement {
        discriminant: Box<Node>,
        cases: Vec<Node>,
    },
    SwitchCase {
        test: Option<Box<Node>>,
        consequent: Vec<Node>,
    },
    ReturnStatement {
        argument: Option<Box<Node>>,
    },
    ThrowStatement {
        argument: Box<Node>,
    },
    TryStatement {
        block: Box<Node>,
        handler: Option<Box<Node>>,
        finalizer: Option<Box<Node>>,
    },
    CatchClause {
        param: Box<Node>,
        body: Box<Node>,
    },
    WhileStatement {
        test: Box<Node>,
        body: Box<Node>,
    },
    DoWhileStatement {
        body: Box<Node>,
        test: Box<Node>,
    },
    ForStatement {
        init: Option<Box<Node>>,
        test: Option<Box<Node>>,
        update: Option<Box<Node>>,
        body: Box<Node>,
    },
    ForInStatement {
        left: Box<Node>,
        right: Box<Node>,
        body: Box<Node>,
    },
    VariableDeclaration {
        declarations: Vec<Node>,
        #[serde(default = "default_var_kind")]
        kind: String,
    },
    VariableDeclarator {
        id: Box<Node>,
        init: Option<Box<Node>>,
    },
    FunctionDeclaration {
        id: Box<Node>,
        params: Vec<Node>,
        body: Box<Node>,
    },
    FunctionExpression {
        id: Option<Box<Node>>,
        params: Vec<Node>,
        body: Box<Node>,
    },
    Identifier {
        name: String,
    },
    Literal {
        value: serde_json::Value,
        regex: Option<serde_json::Value>,
    },
    ThisExpression,
    ArrayExpression {
        elements: Vec<Option<Node>>,
    },
    ObjectExpression {
        properties: Vec<Node>,
    },
    Property {
        key: Box<Node>,
        value: Box<Node>,
        #[serde(default = "default_property_kind")]
        kind: String,
    },
    SequenceExpression {
        expressions: Vec<Node>,
    },
    UnaryExpression {
        operator: String,
        argument: Box<Node>,
    },
    UpdateExpression {
        operator: String,
        argument: Box<Node>,
        #[serde(default)]
        prefix: bool,
    },
    BinaryExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    LogicalExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    AssignmentExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    ConditionalExpression {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Box<Node>,
    },
    CallExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    NewExpression {
        callee: Box<Node>,
        #[serde(default)]
        arguments: Vec<Node>,
    },
    MemberExpression {
        object: Box<Node>,
        property: Box<Node>,
        #[serde(default)]
        computed: bool,
    },
}

fn default_var_kind() -> String {
    "var".to_string()
}

fn default_property_kind() -> String {
    "init".to_string()
}

impl Node {
    /// Deserialize an ESTree program from its JSON form (the shape produced
    /// by esprima/acorn with `ranges: true`). An unrecognized `"type"` tag
    /// fails here, which is how unknown node kinds surface to the caller.
    pub fn from_json(ast: &serde_json::Value) -> Result<Node, JSError> {
        serde_json::from_value(ast.clone()).map_err(|e| raise_parse_error!("malformed AST: {e}"))
    }
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::EmptyStatement => "EmptyStatement",
            NodeKind::DebuggerStatement => "DebuggerStatement",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::LabeledStatement { .. } => "LabeledStatement",
            NodeKind::BreakStatement { .. } => "BreakStatement",
            NodeKind::ContinueStatement { .. } => "ContinueStatement",
            NodeKind::WithStatement { .. } => "WithStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::ThrowStatement { .. } => "ThrowStatement",
            NodeKind::TryStatement { .. } => "TryStatement",
            NodeKind::CatchClause { .. } => "CatchClause",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::DoWhileStatement { .. } => "DoWhileStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::ForInStatement { .. } => "ForInStatement",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeKind::FunctionExpression { .. } => "FunctionExpression",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::ThisExpression => "ThisExpression",
            NodeKind::ArrayExpression { .. } => "ArrayExpression",
            NodeKind::ObjectExpression { .. } => "ObjectExpression",
            NodeKind::Property { .. } => "Property",
            NodeKind::SequenceExpression { .. } => "SequenceExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::UpdateExpression { .. } => "UpdateExpression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::LogicalExpression { .. } => "LogicalExpression",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::NewExpression { .. } => "NewExpression",
            NodeKind::MemberExpression { .. } => "MemberExpression",
        }
    }
}
