use crate::core::ast::{Node, NodeKind};
use crate::core::eval::{
    BinaryOp, ControlFlow, EvalError, ExprThunk, StmtThunk, Target, apply_binary, call_method, construct, flow_from,
    get_property, invoke, make_error, target_delete, target_read, target_write, to_number, to_property_key,
};
use crate::core::number::to_int32;
use crate::core::scope::{self, Scope, ScopePtr};
use crate::core::value::{
    AccessorData, FunctionTemplate, Hoisted, Value, enumerate_keys, is_truthy, make_function, new_object, set_own,
    strict_equals, type_of,
};
use crate::core::{Interpreter, PropertyKey};
use crate::{JSError, raise_syntax_error};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// An lvalue thunk: resolves an assignment target into an (owner, key)
/// pair so reads, writes, and deletes go through one path.
type RefThunk = Rc<dyn Fn(&Interpreter, &ScopePtr) -> Result<Target, EvalError>>;

/// A switch case test: yields the case value, or the `DefaultCase`
/// sentinel for the `default` clause.
type CaseTest = Rc<dyn Fn(&Interpreter, &ScopePtr) -> Result<ControlFlow, JSError>>;

/// Evaluate an expression inside a statement thunk, turning a thrown value
/// into a `Throw` signal for the enclosing statement to see.
macro_rules! eval_or_flow {
    ($res:expr) => {
        match $res {
            Ok(v) => v,
            Err(EvalError::Thrown(t)) => return Ok(ControlFlow::Throw(t)),
            Err(EvalError::Js(e)) => return Err(e),
        }
    };
}

/// Compiles AST nodes into thunks. Compile-time work (building sub-thunks,
/// extracting operator tags, collecting hoisted declarations, slicing
/// function source text) happens once; running a loop body re-executes
/// pre-built closures rather than walking the AST again.
pub struct Compiler {
    source: Rc<str>,
}

struct PropGroup {
    init: Option<ExprThunk>,
    get: Option<Rc<FunctionTemplate>>,
    set: Option<Rc<FunctionTemplate>>,
}

enum CompiledKey {
    Const(PropertyKey),
    Computed(ExprThunk),
}

impl CompiledKey {
    fn resolve(&self, interp: &Interpreter, scope: &ScopePtr) -> Result<PropertyKey, EvalError> {
        match self {
            CompiledKey::Const(k) => Ok(k.clone()),
            CompiledKey::Computed(thunk) => {
                let v = thunk(interp, scope)?;
                to_property_key(interp, &v)
            }
        }
    }
}

fn ident_name(node: &Node) -> Result<String, JSError> {
    match &node.kind {
        NodeKind::Identifier { name } => Ok(name.clone()),
        other => Err(raise_syntax_error!("expected identifier, found {}", other.name())),
    }
}

impl Compiler {
    pub fn new(source: &str) -> Self {
        Compiler {
            source: Rc::from(source),
        }
    }

    pub fn compile_program(&self, node: &Node) -> Result<(Hoisted, StmtThunk), JSError> {
        match &node.kind {
            NodeKind::Program { body } => {
                let mut hoisted = Hoisted::default();
                self.collect_hoisted(body, &mut hoisted)?;
                let thunk = self.compile_stmt_list(body)?;
                Ok((hoisted, thunk))
            }
            other => Err(raise_syntax_error!("expected Program, found {}", other.name())),
        }
    }

    // ---- hoisting ----

    fn collect_hoisted(&self, stmts: &[Node], hoisted: &mut Hoisted) -> Result<(), JSError> {
        for stmt in stmts {
            self.collect_hoisted_stmt(stmt, hoisted)?;
        }
        Ok(())
    }

    /// Walk a statement for `var` and function declarations, stopping at
    /// nested function boundaries (their bodies hoist into their own frame).
    fn collect_hoisted_stmt(&self, node: &Node, hoisted: &mut Hoisted) -> Result<(), JSError> {
        match &node.kind {
            NodeKind::VariableDeclaration { declarations, .. } => {
                for decl in declarations {
                    if let NodeKind::VariableDeclarator { id, .. } = &decl.kind {
                        let name = ident_name(id)?;
                        if !hoisted.vars.contains(&name) {
                            hoisted.vars.push(name);
                        }
                    }
                }
            }
            NodeKind::FunctionDeclaration { id, .. } => {
                let name = ident_name(id)?;
                let template = self.compile_function_node(node, "")?;
                hoisted.funcs.push((name, template));
            }
            NodeKind::BlockStatement { body } | NodeKind::Program { body } => {
                self.collect_hoisted(body, hoisted)?;
            }
            NodeKind::IfStatement {
                consequent, alternate, ..
            } => {
                self.collect_hoisted_stmt(consequent, hoisted)?;
                if let Some(alt) = alternate {
                    self.collect_hoisted_stmt(alt, hoisted)?;
                }
            }
            NodeKind::LabeledStatement { body, .. }
            | NodeKind::WhileStatement { body, .. }
            | NodeKind::DoWhileStatement { body, .. }
            | NodeKind::WithStatement { body, .. } => {
                self.collect_hoisted_stmt(body, hoisted)?;
            }
            NodeKind::ForStatement { init, body, .. } => {
                if let Some(init) = init
                    && matches!(init.kind, NodeKind::VariableDeclaration { .. })
                {
                    self.collect_hoisted_stmt(init, hoisted)?;
                }
                self.collect_hoisted_stmt(body, hoisted)?;
            }
            NodeKind::ForInStatement { left, body, .. } => {
                if matches!(left.kind, NodeKind::VariableDeclaration { .. }) {
                    self.collect_hoisted_stmt(left, hoisted)?;
                }
                self.collect_hoisted_stmt(body, hoisted)?;
            }
            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                self.collect_hoisted_stmt(block, hoisted)?;
                if let Some(h) = handler
                    && let NodeKind::CatchClause { body, .. } = &h.kind
                {
                    self.collect_hoisted_stmt(body, hoisted)?;
                }
                if let Some(f) = finalizer {
                    self.collect_hoisted_stmt(f, hoisted)?;
                }
            }
            NodeKind::SwitchStatement { cases, .. } => {
                for case in cases {
                    if let NodeKind::SwitchCase { consequent, .. } = &case.kind {
                        self.collect_hoisted(consequent, hoisted)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    // ---- statements ----

    fn compile_stmt_list(&self, stmts: &[Node]) -> Result<StmtThunk, JSError> {
        let thunks: Vec<StmtThunk> = stmts.iter().map(|s| self.compile_stmt(s)).collect::<Result<_, _>>()?;
        Ok(Rc::new(move |interp, scope, _label| {
            let mut last = ControlFlow::Empty;
            for thunk in &thunks {
                let result = thunk(interp, scope, None)?;
                interp.set_value(&result);
                if result.is_signal() {
                    return Ok(result);
                }
                if matches!(result, ControlFlow::Normal(_)) {
                    last = result;
                }
            }
            Ok(last)
        }))
    }

    pub fn compile_stmt(&self, node: &Node) -> Result<StmtThunk, JSError> {
        match &node.kind {
            NodeKind::EmptyStatement | NodeKind::DebuggerStatement => Ok(Rc::new(|_, _, _| Ok(ControlFlow::Empty))),

            // installed at activation; nothing left to do at run time
            NodeKind::FunctionDeclaration { .. } => Ok(Rc::new(|_, _, _| Ok(ControlFlow::Empty))),

            NodeKind::ExpressionStatement { expression } => {
                let expr = self.compile_expr(expression)?;
                Ok(Rc::new(move |interp, scope, _| flow_from(expr(interp, scope))))
            }

            NodeKind::BlockStatement { body } => self.compile_stmt_list(body),

            NodeKind::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                let test = self.compile_expr(test)?;
                let consequent = self.compile_stmt(consequent)?;
                let alternate = alternate.as_ref().map(|a| self.compile_stmt(a)).transpose()?;
                Ok(Rc::new(move |interp, scope, _| {
                    let t = eval_or_flow!(test(interp, scope));
                    if is_truthy(&t) {
                        consequent(interp, scope, None)
                    } else if let Some(alt) = &alternate {
                        alt(interp, scope, None)
                    } else {
                        Ok(ControlFlow::Empty)
                    }
                }))
            }

            NodeKind::WhileStatement { test, body } => {
                let test = self.compile_expr(test)?;
                let body = self.compile_stmt(body)?;
                Ok(make_loop(None, Some(test), None, body, false))
            }

            NodeKind::DoWhileStatement { body, test } => {
                let test = self.compile_expr(test)?;
                let body = self.compile_stmt(body)?;
                Ok(make_loop(None, Some(test), None, body, true))
            }

            NodeKind::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                let init = match init {
                    None => None,
                    Some(n) => Some(match &n.kind {
                        NodeKind::VariableDeclaration { .. } => self.compile_stmt(n)?,
                        _ => {
                            let e = self.compile_expr(n)?;
                            Rc::new(move |interp: &Interpreter, scope: &ScopePtr, _: Option<&str>| {
                                flow_from(e(interp, scope))
                            }) as StmtThunk
                        }
                    }),
                };
                let test = test.as_ref().map(|t| self.compile_expr(t)).transpose()?;
                let update = update.as_ref().map(|u| self.compile_expr(u)).transpose()?;
                let body = self.compile_stmt(body)?;
                Ok(make_loop(init, test, update, body, false))
            }

            NodeKind::ForInStatement { left, right, body } => self.compile_for_in(left, right, body),

            NodeKind::WithStatement { object, body } => {
                let object = self.compile_expr(object)?;
                let body = self.compile_stmt(body)?;
                Ok(Rc::new(move |interp, scope, _| {
                    let source = eval_or_flow!(object(interp, scope));
                    if !matches!(source, Value::Object(_)) {
                        return Ok(ControlFlow::Throw(make_error("TypeError", "with statement requires an object")));
                    }
                    let overlay = Scope::child(scope, "with");
                    if let Value::Object(src) = &source {
                        for key in enumerate_keys(src) {
                            let val = eval_or_flow!(get_property(interp, &source, &key));
                            set_own(&overlay.data, key, val);
                        }
                    }
                    body(interp, &overlay, None)
                }))
            }

            NodeKind::SwitchStatement { discriminant, cases } => self.compile_switch(discriminant, cases),

            NodeKind::LabeledStatement { label, body } => {
                let label_name = ident_name(label)?;
                let body = self.compile_stmt(body)?;
                Ok(Rc::new(move |interp, scope, _| {
                    scope.labels.borrow_mut().push(label_name.clone());
                    let result = body(interp, scope, Some(label_name.as_str()));
                    scope.labels.borrow_mut().pop();
                    match result? {
                        ControlFlow::Break(Some(l)) if l == label_name => Ok(ControlFlow::Normal(Value::Undefined)),
                        other => Ok(other),
                    }
                }))
            }

            NodeKind::BreakStatement { label } => {
                let label = label.as_ref().map(|l| ident_name(l)).transpose()?;
                Ok(Rc::new(move |_, _, _| Ok(ControlFlow::Break(label.clone()))))
            }

            NodeKind::ContinueStatement { label } => {
                let label = label.as_ref().map(|l| ident_name(l)).transpose()?;
                Ok(Rc::new(move |_, _, _| Ok(ControlFlow::Continue(label.clone()))))
            }

            NodeKind::ReturnStatement { argument } => {
                let argument = argument.as_ref().map(|a| self.compile_expr(a)).transpose()?;
                Ok(Rc::new(move |interp, scope, _| {
                    let v = match &argument {
                        Some(a) => eval_or_flow!(a(interp, scope)),
                        None => Value::Undefined,
                    };
                    Ok(ControlFlow::Return(v))
                }))
            }

            NodeKind::ThrowStatement { argument } => {
                let argument = self.compile_expr(argument)?;
                Ok(Rc::new(move |interp, scope, _| {
                    let v = eval_or_flow!(argument(interp, scope));
                    Ok(ControlFlow::Throw(v))
                }))
            }

            NodeKind::TryStatement {
                block,
                handler,
                finalizer,
            } => self.compile_try(block, handler.as_deref(), finalizer.as_deref()),

            NodeKind::VariableDeclaration { declarations, .. } => {
                // names were hoisted; only initializers remain, run as
                // assignments in declaration order
                let mut assigns: Vec<(String, ExprThunk)> = Vec::new();
                for decl in declarations {
                    match &decl.kind {
                        NodeKind::VariableDeclarator { id, init } => {
                            let name = ident_name(id)?;
                            if let Some(init) = init {
                                let value = self.compile_expr_named(init, &name)?;
                                assigns.push((name, value));
                            }
                        }
                        other => return Err(raise_syntax_error!("expected declarator, found {}", other.name())),
                    }
                }
                Ok(Rc::new(move |interp, scope, _| {
                    for (name, value) in &assigns {
                        let v = eval_or_flow!(value(interp, scope));
                        let target = Target::Scoped(scope::owner(scope, name), PropertyKey::from(name.as_str()));
                        eval_or_flow!(target_write(interp, &target, v));
                    }
                    Ok(ControlFlow::Empty)
                }))
            }

            other => Err(raise_syntax_error!("unsupported statement kind {}", other.name())),
        }
    }

    fn compile_for_in(&self, left: &Node, right: &Node, body: &Node) -> Result<StmtThunk, JSError> {
        let (declaration, target): (Option<StmtThunk>, RefThunk) = match &left.kind {
            NodeKind::VariableDeclaration { declarations, .. } => {
                if declarations.len() != 1 {
                    return Err(raise_syntax_error!("for-in declaration must declare exactly one name"));
                }
                let name = match &declarations[0].kind {
                    NodeKind::VariableDeclarator { id, .. } => ident_name(id)?,
                    other => return Err(raise_syntax_error!("expected declarator, found {}", other.name())),
                };
                // the declaration runs first (hoist + optional initializer);
                // the binding itself becomes the loop target
                (Some(self.compile_stmt(left)?), ident_ref(&name))
            }
            _ => (None, self.compile_ref(left)?),
        };
        let right = self.compile_expr(right)?;
        let body = self.compile_stmt(body)?;
        Ok(Rc::new(move |interp, scope, label| {
            if let Some(decl) = &declaration {
                let r = decl(interp, scope, None)?;
                if r.is_signal() {
                    return Ok(r);
                }
            }
            let enumerated = eval_or_flow!(right(interp, scope));
            let keys: Vec<PropertyKey> = match &enumerated {
                Value::Object(obj) => enumerate_keys(obj),
                Value::String(s) => (0..crate::js_string::utf16_len(s)).map(PropertyKey::from).collect(),
                _ => Vec::new(),
            };
            let mut result = ControlFlow::Empty;
            for key in keys {
                eval_or_flow!(interp.check_deadline());
                let t = eval_or_flow!(target(interp, scope));
                eval_or_flow!(target_write(
                    interp,
                    &t,
                    Value::String(Rc::from(key.to_string().as_str()))
                ));
                let r = body(interp, scope, None)?;
                match r {
                    ControlFlow::Empty | ControlFlow::Continue(None) | ControlFlow::DefaultCase => {}
                    ControlFlow::Continue(Some(ref l)) if Some(l.as_str()) == label => {}
                    ControlFlow::Break(None) => break,
                    ControlFlow::Normal(v) => result = ControlFlow::Normal(v),
                    other => return Ok(other),
                }
            }
            Ok(result)
        }))
    }

    fn compile_switch(&self, discriminant: &Node, cases: &[Node]) -> Result<StmtThunk, JSError> {
        let discriminant = self.compile_expr(discriminant)?;
        let mut compiled: Vec<(CaseTest, StmtThunk)> = Vec::new();
        for case in cases {
            match &case.kind {
                NodeKind::SwitchCase { test, consequent } => {
                    let test_thunk: CaseTest = match test {
                        Some(t) => {
                            let e = self.compile_expr(t)?;
                            Rc::new(move |interp, scope| flow_from(e(interp, scope)))
                        }
                        None => Rc::new(|_, _| Ok(ControlFlow::DefaultCase)),
                    };
                    let body = self.compile_stmt_list(consequent)?;
                    compiled.push((test_thunk, body));
                }
                other => return Err(raise_syntax_error!("expected switch case, found {}", other.name())),
            }
        }
        Ok(Rc::new(move |interp, scope, _| {
            let d = eval_or_flow!(discriminant(interp, scope));
            let mut matched = false;
            let mut default_index: Option<usize> = None;
            let mut result = ControlFlow::Empty;
            for (i, (test, body)) in compiled.iter().enumerate() {
                if !matched {
                    match test(interp, scope)? {
                        ControlFlow::DefaultCase => {
                            default_index = Some(i);
                            continue;
                        }
                        ControlFlow::Normal(tv) => {
                            if !strict_equals(&tv, &d) {
                                continue;
                            }
                            matched = true;
                        }
                        other => return Ok(other),
                    }
                }
                match run_case_body(interp, scope, body, &mut result)? {
                    CaseOutcome::FallThrough => {}
                    CaseOutcome::Done => return Ok(result),
                    CaseOutcome::Propagate(flow) => return Ok(flow),
                }
            }
            // nothing matched: resume at the default clause and fall through
            if !matched && let Some(start) = default_index {
                for (_, body) in &compiled[start..] {
                    match run_case_body(interp, scope, body, &mut result)? {
                        CaseOutcome::FallThrough => {}
                        CaseOutcome::Done => return Ok(result),
                        CaseOutcome::Propagate(flow) => return Ok(flow),
                    }
                }
            }
            Ok(result)
        }))
    }

    fn compile_try(&self, block: &Node, handler: Option<&Node>, finalizer: Option<&Node>) -> Result<StmtThunk, JSError> {
        let try_body = self.compile_stmt(block)?;
        let catch = match handler {
            Some(h) => match &h.kind {
                NodeKind::CatchClause { param, body } => Some((ident_name(param)?, self.compile_stmt(body)?)),
                other => return Err(raise_syntax_error!("expected catch clause, found {}", other.name())),
            },
            None => None,
        };
        let finalizer = finalizer.map(|f| self.compile_stmt(f)).transpose()?;
        Ok(Rc::new(move |interp, scope, _| {
            let mut result = try_body(interp, scope, None)?;
            if let ControlFlow::Throw(exc) = &result
                && let Some((param, catch_body)) = &catch
            {
                let exc = exc.clone();
                // transactional catch binding in the current scope
                let key = PropertyKey::from(param.as_str());
                let saved = scope.data.borrow().get(&key);
                scope.data.borrow_mut().insert(key.clone(), Rc::new(RefCell::new(exc)));
                let caught = catch_body(interp, scope, None);
                match saved {
                    Some(slot) => {
                        scope.data.borrow_mut().insert(key, slot);
                    }
                    None => {
                        scope.data.borrow_mut().remove(&key);
                    }
                }
                result = caught?;
            }
            if let Some(fin) = &finalizer {
                let f = fin(interp, scope, None)?;
                if f.is_signal() {
                    result = f;
                }
            }
            Ok(result)
        }))
    }

    // ---- expressions ----

    pub fn compile_expr(&self, node: &Node) -> Result<ExprThunk, JSError> {
        match &node.kind {
            NodeKind::Identifier { name } => {
                let name = name.clone();
                Ok(Rc::new(move |_, scope| {
                    Ok(scope::lookup(scope, &name)
                        .map(|slot| slot.borrow().clone())
                        .unwrap_or(Value::Undefined))
                }))
            }

            NodeKind::Literal { value, regex } => {
                if regex.is_some() {
                    return Err(raise_syntax_error!("regular expression literals are not supported"));
                }
                let v = match value {
                    serde_json::Value::Null => Value::Null,
                    serde_json::Value::Bool(b) => Value::Boolean(*b),
                    serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
                    serde_json::Value::String(s) => Value::String(Rc::from(s.as_str())),
                    other => return Err(raise_syntax_error!("unsupported literal {other}")),
                };
                Ok(Rc::new(move |_, _| Ok(v.clone())))
            }

            NodeKind::ThisExpression => Ok(Rc::new(|interp, _| Ok(interp.current_context()))),

            NodeKind::ArrayExpression { elements } => {
                let elements: Vec<Option<ExprThunk>> = elements
                    .iter()
                    .map(|e| e.as_ref().map(|n| self.compile_expr(n)).transpose())
                    .collect::<Result<_, _>>()?;
                Ok(Rc::new(move |interp, scope| {
                    let mut values = Vec::with_capacity(elements.len());
                    for element in &elements {
                        values.push(match element {
                            Some(thunk) => thunk(interp, scope)?,
                            None => Value::Undefined,
                        });
                    }
                    Ok(crate::js_array::make_array(values))
                }))
            }

            NodeKind::ObjectExpression { properties } => self.compile_object_literal(properties),

            NodeKind::SequenceExpression { expressions } => {
                let thunks: Vec<ExprThunk> = expressions.iter().map(|e| self.compile_expr(e)).collect::<Result<_, _>>()?;
                Ok(Rc::new(move |interp, scope| {
                    let mut last = Value::Undefined;
                    for thunk in &thunks {
                        last = thunk(interp, scope)?;
                    }
                    Ok(last)
                }))
            }

            NodeKind::UnaryExpression { operator, argument } => self.compile_unary(operator, argument),

            NodeKind::UpdateExpression {
                operator,
                argument,
                prefix,
            } => {
                let target = self.compile_ref(argument)?;
                let increment = operator == "++";
                let prefix = *prefix;
                Ok(Rc::new(move |interp, scope| {
                    let t = target(interp, scope)?;
                    let old = to_number(interp, &target_read(interp, &t)?)?;
                    let new = if increment { old + 1.0 } else { old - 1.0 };
                    target_write(interp, &t, Value::Number(new))?;
                    Ok(Value::Number(if prefix { new } else { old }))
                }))
            }

            NodeKind::BinaryExpression { operator, left, right } => {
                let op = BinaryOp::from_str(operator)
                    .ok_or_else(|| raise_syntax_error!("unknown binary operator '{operator}'"))?;
                let left = self.compile_expr(left)?;
                let right = self.compile_expr(right)?;
                Ok(Rc::new(move |interp, scope| {
                    let l = left(interp, scope)?;
                    let r = right(interp, scope)?;
                    apply_binary(interp, op, &l, &r)
                }))
            }

            NodeKind::LogicalExpression { operator, left, right } => {
                let and = match operator.as_str() {
                    "&&" => true,
                    "||" => false,
                    other => return Err(raise_syntax_error!("unknown logical operator '{other}'")),
                };
                let left = self.compile_expr(left)?;
                let right = self.compile_expr(right)?;
                Ok(Rc::new(move |interp, scope| {
                    let l = left(interp, scope)?;
                    if is_truthy(&l) == and {
                        right(interp, scope)
                    } else {
                        Ok(l)
                    }
                }))
            }

            NodeKind::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                let test = self.compile_expr(test)?;
                let consequent = self.compile_expr(consequent)?;
                let alternate = self.compile_expr(alternate)?;
                Ok(Rc::new(move |interp, scope| {
                    if is_truthy(&test(interp, scope)?) {
                        consequent(interp, scope)
                    } else {
                        alternate(interp, scope)
                    }
                }))
            }

            NodeKind::AssignmentExpression { operator, left, right } => self.compile_assignment(operator, left, right),

            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => {
                let object = self.compile_expr(object)?;
                let key = self.compile_key(property, *computed)?;
                Ok(Rc::new(move |interp, scope| {
                    let base = object(interp, scope)?;
                    let k = key.resolve(interp, scope)?;
                    get_property(interp, &base, &k)
                }))
            }

            NodeKind::CallExpression { callee, arguments } => self.compile_call(callee, arguments),

            NodeKind::NewExpression { callee, arguments } => {
                let callee = self.compile_expr(callee)?;
                let arguments: Vec<ExprThunk> = arguments.iter().map(|a| self.compile_expr(a)).collect::<Result<_, _>>()?;
                Ok(Rc::new(move |interp, scope| {
                    let ctor = callee(interp, scope)?;
                    let mut argv = Vec::with_capacity(arguments.len());
                    for a in &arguments {
                        argv.push(a(interp, scope)?);
                    }
                    construct(interp, &ctor, &argv)
                }))
            }

            NodeKind::FunctionExpression { .. } => {
                let template = self.compile_function_node(node, "")?;
                Ok(Rc::new(move |_, scope| Ok(make_function(&template, scope))))
            }

            other => Err(raise_syntax_error!("unsupported expression kind {}", other.name())),
        }
    }

    /// Like `compile_expr`, but an anonymous function expression on the
    /// right of `name = function(){}` (or a `var` initializer) inherits the
    /// target name so `$name` reports it.
    fn compile_expr_named(&self, node: &Node, inferred: &str) -> Result<ExprThunk, JSError> {
        if let NodeKind::FunctionExpression { id: None, .. } = &node.kind {
            let template = self.compile_function_node(node, inferred)?;
            return Ok(Rc::new(move |_, scope| Ok(make_function(&template, scope))));
        }
        self.compile_expr(node)
    }

    fn compile_object_literal(&self, properties: &[Node]) -> Result<ExprThunk, JSError> {
        // group by key so accessors pair up and duplicate data keys keep
        // only the last initializer
        let mut groups: IndexMap<PropertyKey, PropGroup> = IndexMap::new();
        for prop in properties {
            match &prop.kind {
                NodeKind::Property { key, value, kind } => {
                    let pk = match &key.kind {
                        NodeKind::Identifier { name } => PropertyKey::from(name.as_str()),
                        NodeKind::Literal { value, .. } => match value {
                            serde_json::Value::String(s) => PropertyKey::from(s.as_str()),
                            serde_json::Value::Number(n) => PropertyKey::from(n.as_f64().unwrap_or(f64::NAN)),
                            other => return Err(raise_syntax_error!("unsupported property key {other}")),
                        },
                        other => return Err(raise_syntax_error!("unsupported property key kind {}", other.name())),
                    };
                    let entry = groups.entry(pk).or_insert_with(|| PropGroup {
                        init: None,
                        get: None,
                        set: None,
                    });
                    match kind.as_str() {
                        "init" => entry.init = Some(self.compile_expr(value)?),
                        "get" => entry.get = Some(self.compile_function_node(value, "")?),
                        "set" => entry.set = Some(self.compile_function_node(value, "")?),
                        other => return Err(raise_syntax_error!("unsupported property kind '{other}'")),
                    }
                }
                other => return Err(raise_syntax_error!("expected property, found {}", other.name())),
            }
        }
        Ok(Rc::new(move |interp, scope| {
            let obj = new_object();
            for (key, group) in &groups {
                if group.get.is_some() || group.set.is_some() {
                    let accessor = Value::Accessor(Rc::new(AccessorData {
                        get: group.get.as_ref().map(|t| make_function(t, scope)),
                        set: group.set.as_ref().map(|t| make_function(t, scope)),
                    }));
                    set_own(&obj, key.clone(), accessor);
                } else if let Some(init) = &group.init {
                    let v = init(interp, scope)?;
                    set_own(&obj, key.clone(), v);
                }
            }
            Ok(Value::Object(obj))
        }))
    }

    fn compile_unary(&self, operator: &str, argument: &Node) -> Result<ExprThunk, JSError> {
        match operator {
            "delete" => {
                // non-reference operands evaluate for effect and yield true
                match self.compile_ref(argument) {
                    Ok(target) => Ok(Rc::new(move |interp, scope| {
                        let t = target(interp, scope)?;
                        target_delete(&t)
                    })),
                    Err(_) => {
                        let argument = self.compile_expr(argument)?;
                        Ok(Rc::new(move |interp, scope| {
                            argument(interp, scope)?;
                            Ok(Value::Boolean(true))
                        }))
                    }
                }
            }
            "typeof" => {
                let argument = self.compile_expr(argument)?;
                Ok(Rc::new(move |interp, scope| {
                    let v = argument(interp, scope)?;
                    Ok(Value::String(Rc::from(type_of(&v))))
                }))
            }
            "-" => {
                let argument = self.compile_expr(argument)?;
                Ok(Rc::new(move |interp, scope| {
                    let v = argument(interp, scope)?;
                    Ok(Value::Number(-to_number(interp, &v)?))
                }))
            }
            "+" => {
                let argument = self.compile_expr(argument)?;
                Ok(Rc::new(move |interp, scope| {
                    let v = argument(interp, scope)?;
                    Ok(Value::Number(to_number(interp, &v)?))
                }))
            }
            "!" => {
                let argument = self.compile_expr(argument)?;
                Ok(Rc::new(move |interp, scope| {
                    let v = argument(interp, scope)?;
                    Ok(Value::Boolean(!is_truthy(&v)))
                }))
            }
            "~" => {
                let argument = self.compile_expr(argument)?;
                Ok(Rc::new(move |interp, scope| {
                    let v = argument(interp, scope)?;
                    Ok(Value::Number(!to_int32(to_number(interp, &v)?) as f64))
                }))
            }
            "void" => {
                let argument = self.compile_expr(argument)?;
                Ok(Rc::new(move |interp, scope| {
                    argument(interp, scope)?;
                    Ok(Value::Undefined)
                }))
            }
            other => Err(raise_syntax_error!("unknown unary operator '{other}'")),
        }
    }

    fn compile_assignment(&self, operator: &str, left: &Node, right: &Node) -> Result<ExprThunk, JSError> {
        let target = self.compile_ref(left)?;
        if operator == "=" {
            let value = match (&left.kind, &right.kind) {
                (NodeKind::Identifier { name }, NodeKind::FunctionExpression { id: None, .. }) => {
                    self.compile_expr_named(right, name)?
                }
                _ => self.compile_expr(right)?,
            };
            return Ok(Rc::new(move |interp, scope| {
                let t = target(interp, scope)?;
                let v = value(interp, scope)?;
                target_write(interp, &t, v.clone())?;
                Ok(v)
            }));
        }
        let op = BinaryOp::from_str(operator.trim_end_matches('='))
            .ok_or_else(|| raise_syntax_error!("unknown assignment operator '{operator}'"))?;
        let value = self.compile_expr(right)?;
        Ok(Rc::new(move |interp, scope| {
            let t = target(interp, scope)?;
            let old = target_read(interp, &t)?;
            let v = value(interp, scope)?;
            let result = apply_binary(interp, op, &old, &v)?;
            target_write(interp, &t, result.clone())?;
            Ok(result)
        }))
    }

    fn compile_call(&self, callee: &Node, arguments: &[Node]) -> Result<ExprThunk, JSError> {
        let args: Vec<ExprThunk> = arguments.iter().map(|a| self.compile_expr(a)).collect::<Result<_, _>>()?;
        match &callee.kind {
            // method call: the receiver becomes `this`
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => {
                let object = self.compile_expr(object)?;
                let key = self.compile_key(property, *computed)?;
                Ok(Rc::new(move |interp, scope| {
                    let base = object(interp, scope)?;
                    let k = key.resolve(interp, scope)?;
                    let mut argv = Vec::with_capacity(args.len());
                    for a in &args {
                        argv.push(a(interp, scope)?);
                    }
                    call_method(interp, &base, &k, &argv)
                }))
            }
            // plain call: `this` is the root context
            _ => {
                let callee = self.compile_expr(callee)?;
                Ok(Rc::new(move |interp, scope| {
                    let f = callee(interp, scope)?;
                    let mut argv = Vec::with_capacity(args.len());
                    for a in &args {
                        argv.push(a(interp, scope)?);
                    }
                    invoke(interp, &f, interp.root_context(), &argv)
                }))
            }
        }
    }

    fn compile_key(&self, property: &Node, computed: bool) -> Result<CompiledKey, JSError> {
        if computed {
            return Ok(CompiledKey::Computed(self.compile_expr(property)?));
        }
        match &property.kind {
            NodeKind::Identifier { name } => Ok(CompiledKey::Const(PropertyKey::from(name.as_str()))),
            other => Err(raise_syntax_error!("expected property name, found {}", other.name())),
        }
    }

    /// Lvalue decomposition: identifiers resolve to the owning frame's data
    /// table (the root for undeclared names), member expressions to the
    /// evaluated receiver plus key.
    fn compile_ref(&self, node: &Node) -> Result<RefThunk, JSError> {
        match &node.kind {
            NodeKind::Identifier { name } => Ok(ident_ref(name)),
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => {
                let object = self.compile_expr(object)?;
                let key = self.compile_key(property, *computed)?;
                Ok(Rc::new(move |interp, scope| {
                    let base = object(interp, scope)?;
                    let k = key.resolve(interp, scope)?;
                    Ok(Target::Member(base, k))
                }))
            }
            other => Err(raise_syntax_error!("invalid assignment target {}", other.name())),
        }
    }

    /// Compile a function expression or declaration into its shared
    /// template: parameter names, hoist lists, the body thunk, and the
    /// source slice for `toString`.
    fn compile_function_node(&self, node: &Node, inferred: &str) -> Result<Rc<FunctionTemplate>, JSError> {
        let (name, params, body, binds_own_name) = match &node.kind {
            NodeKind::FunctionExpression { id, params, body } => {
                let name = match id {
                    Some(id) => ident_name(id)?,
                    None => inferred.to_string(),
                };
                (name, params, body, id.is_some())
            }
            NodeKind::FunctionDeclaration { id, params, body } => (ident_name(id)?, params, body, false),
            other => return Err(raise_syntax_error!("expected function, found {}", other.name())),
        };
        let param_names: Vec<String> = params.iter().map(ident_name).collect::<Result<_, _>>()?;
        let body_stmts = match &body.kind {
            NodeKind::BlockStatement { body } => body,
            other => return Err(raise_syntax_error!("expected function body, found {}", other.name())),
        };
        let mut hoisted = Hoisted::default();
        self.collect_hoisted(body_stmts, &mut hoisted)?;
        let body_thunk = self.compile_stmt_list(body_stmts)?;
        let source: Rc<str> = Rc::from(self.source.get(node.start..node.end).unwrap_or(""));
        log::trace!("compiled function '{}' ({} params)", name, param_names.len());
        Ok(Rc::new(FunctionTemplate {
            name,
            params: param_names,
            start: node.start,
            end: node.end,
            source,
            body: body_thunk,
            hoisted,
            binds_own_name,
        }))
    }
}

fn ident_ref(name: &str) -> RefThunk {
    let name = name.to_string();
    Rc::new(move |_, scope| {
        Ok(Target::Scoped(
            scope::owner(scope, &name),
            PropertyKey::from(name.as_str()),
        ))
    })
}

/// The unified loop engine behind `for`, `while` and `do-while`. The
/// enclosing label (if any) arrives through the thunk's label argument so
/// `continue label;` aimed at this loop is swallowed here.
fn make_loop(
    init: Option<StmtThunk>,
    test: Option<ExprThunk>,
    update: Option<ExprThunk>,
    body: StmtThunk,
    force_first: bool,
) -> StmtThunk {
    Rc::new(move |interp, scope, label| {
        if let Some(init) = &init {
            let r = init(interp, scope, None)?;
            if r.is_signal() {
                return Ok(r);
            }
        }
        let mut result = ControlFlow::Empty;
        let mut first = true;
        loop {
            eval_or_flow!(interp.check_deadline());
            let enter = if first && force_first {
                true
            } else {
                match &test {
                    None => true,
                    Some(test) => {
                        let v = eval_or_flow!(test(interp, scope));
                        is_truthy(&v)
                    }
                }
            };
            if !enter {
                break;
            }
            first = false;
            let r = body(interp, scope, None)?;
            match r {
                ControlFlow::Empty | ControlFlow::Continue(None) | ControlFlow::DefaultCase => {}
                ControlFlow::Continue(Some(ref l)) if Some(l.as_str()) == label => {}
                ControlFlow::Break(None) => break,
                ControlFlow::Normal(v) => result = ControlFlow::Normal(v),
                other => return Ok(other),
            }
            if let Some(update) = &update {
                eval_or_flow!(update(interp, scope));
            }
        }
        Ok(result)
    })
}

enum CaseOutcome {
    FallThrough,
    Done,
    Propagate(ControlFlow),
}

fn run_case_body(
    interp: &Interpreter,
    scope: &ScopePtr,
    body: &StmtThunk,
    result: &mut ControlFlow,
) -> Result<CaseOutcome, JSError> {
    let r = body(interp, scope, None)?;
    Ok(match r {
        ControlFlow::Empty | ControlFlow::DefaultCase => CaseOutcome::FallThrough,
        ControlFlow::Normal(v) => {
            *result = ControlFlow::Normal(v);
            CaseOutcome::FallThrough
        }
        // break (and a stray continue) end the switch itself
        ControlFlow::Break(None) | ControlFlow::Continue(None) => CaseOutcome::Done,
        other => CaseOutcome::Propagate(other),
    })
}
