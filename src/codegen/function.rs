//! Function-level lowering: statements, expressions and addresses.
use std::collections::{HashMap, HashSet};

use log::debug;

use crate::ast::{
    Assignment, BinaryExpr, BinaryOp, BlockItem, Break, CastExpr, Compound, Constant, ConstantKind,
    Decl, Expression, For, ForInit, FuncCall, FuncDef, If, InitList, MemberOp, Param, Return,
    Statement, StructRef, Switch, TypeNode, UnaryExpr, UnaryOp, While,
};
use crate::ir::{self, BlockRef, Builder, Instruction, Predicate, Type, Value};
use crate::symbol::{Scope, ScopeMap, Symbol};

use super::types::{lower_fn_type, lower_type, parse_int, struct_fields};
use super::{CResult, CodegenError};

/// Lowers one function definition into the module.
///
/// `values` maps every parameter and local to its stack slot; it is keyed
/// by name alone because the resolver gives the whole body a single scope.
pub(super) struct FunctionGenerator<'a, 'ast> {
    module: &'a mut ir::Module,
    scope: &'a Scope<'ast>,
    constants: &'a HashMap<String, i64>,
    values: HashMap<String, Value>,
    builder: Builder,
    break_targets: Vec<BlockRef>,
    ret_void: bool,
}

impl<'a, 'ast> FunctionGenerator<'a, 'ast> {
    pub(super) fn lower(
        module: &'a mut ir::Module,
        scopes: &'a ScopeMap<'ast>,
        constants: &'a HashMap<String, i64>,
        def: &'ast FuncDef,
    ) -> CResult<()> {
        let Some(name) = &def.decl.name else {
            return Err(CodegenError::unsupported(
                "function definition without a name",
                &def.coord,
            ));
        };
        let TypeNode::Func(func) = &def.decl.ty else {
            return Err(CodegenError::unsupported(
                format!("'{name}' is not a function"),
                &def.decl.coord,
            ));
        };
        let Some(scope) = scopes.function_scope(name) else {
            return Err(CodegenError::unsupported(
                format!("no symbol table for function '{name}'"),
                &def.coord,
            ));
        };
        let scope: &'a Scope<'ast> = scope;

        debug!("lowering function '{name}'");

        let ty = lower_fn_type(func, scope, &def.decl.coord)?;

        let mut param_names = vec![];
        if !ty.params.is_empty() {
            for param in &func.params {
                let Param::Named(decl) = param else { continue };
                match &decl.name {
                    Some(param_name) => param_names.push(param_name.clone()),
                    None => {
                        return Err(CodegenError::unsupported(
                            "unnamed function parameter",
                            &decl.coord,
                        ));
                    }
                }
            }
        }

        // Register the signature first so calls (including recursive ones)
        // can resolve the function.
        module.declare_function(name, ty.clone());

        let ret_void = ty.ret.is_void();
        let function = ir::Function {
            name: name.clone(),
            ty,
            param_names: param_names.clone(),
            blocks: vec![],
        };

        let mut generator = FunctionGenerator {
            module,
            scope,
            constants,
            values: HashMap::new(),
            builder: Builder::new(function),
            break_targets: vec![],
            ret_void,
        };

        let entry = generator.builder.append_block("entry");
        generator.builder.position_at_end(entry);
        for (index, param_name) in param_names.iter().enumerate() {
            let arg = generator.builder.param(index);
            let slot = generator
                .builder
                .alloca(arg.ty(), &format!("{param_name}.addr"));
            generator.builder.store(arg, slot.clone());
            generator.values.insert(param_name.clone(), slot);
        }

        generator.compound(&def.body)?;
        generator.finish();
        Ok(())
    }

    /// Close the function: terminate the open fall-through block, strip
    /// the `dead` sentinels, drop whatever is unreachable from the entry
    /// block, and install the result in the module.
    fn finish(self) {
        let mut function = self.builder.finish();

        function
            .blocks
            .retain(|block| !block.name.starts_with("dead"));

        let reachable = reachable_blocks(&function);
        function.blocks.retain(|block| reachable.contains(&block.name));

        for block in &mut function.blocks {
            if !block.is_terminated() {
                block.instructions.push(if self.ret_void {
                    Instruction::Ret { value: None }
                } else {
                    Instruction::Unreachable
                });
            }
        }

        self.module.define_function(function);
    }

    // ----- statements -----

    fn compound(&mut self, block: &'ast Compound) -> CResult<()> {
        for item in &block.items {
            self.block_item(item)?;
        }
        Ok(())
    }

    fn block_item(&mut self, item: &'ast BlockItem) -> CResult<()> {
        match item {
            BlockItem::Decl(decl) => self.local_decl(decl),
            BlockItem::Statement(stmt) => self.statement(stmt),
        }
    }

    fn statement(&mut self, stmt: &'ast Statement) -> CResult<()> {
        match stmt {
            Statement::Compound(block) => self.compound(block),
            Statement::If(if_stmt) => self.if_stmt(if_stmt),
            Statement::While(while_stmt) => self.while_stmt(while_stmt),
            Statement::For(for_stmt) => self.for_stmt(for_stmt),
            Statement::Switch(switch) => self.switch_stmt(switch),
            Statement::Break(brk) => self.break_stmt(brk),
            Statement::Return(ret) => self.return_stmt(ret),
            Statement::Expression(expr) => self.value(expr).map(|_| ()),
            Statement::Empty => Ok(()),
        }
    }

    fn local_decl(&mut self, decl: &'ast Decl) -> CResult<()> {
        let Some(name) = &decl.name else {
            return Err(CodegenError::unsupported(
                "unsupported declaration inside a function",
                &decl.coord,
            ));
        };
        let ty = lower_type(&decl.ty, self.scope, &decl.coord)?;
        if matches!(ty, Type::Func(_)) {
            return Err(CodegenError::unsupported(
                "local function declarations are not supported",
                &decl.coord,
            ));
        }

        let slot = self.builder.alloca(ty.clone(), name);
        self.values.insert(name.clone(), slot.clone());

        match &decl.init {
            None => Ok(()),
            Some(Expression::InitList(list)) => self.init_list(slot, &ty, list),
            Some(init) => {
                let value = self.value(init)?;
                self.builder.store(value, slot);
                Ok(())
            }
        }
    }

    fn init_list(&mut self, slot: Value, ty: &Type, list: &'ast InitList) -> CResult<()> {
        let Type::Array { len, .. } = ty else {
            return Err(CodegenError::unsupported(
                "initializer lists are only supported for arrays",
                &list.coord,
            ));
        };
        if list.exprs.len() != *len {
            return Err(CodegenError::unsupported(
                format!("expected {len} initializers, found {}", list.exprs.len()),
                &list.coord,
            ));
        }
        for (index, expr) in list.exprs.iter().enumerate() {
            let value = self.value(expr)?;
            let addr = self
                .builder
                .gep(slot.clone(), vec![const_i32(0), const_i32(index as i64)]);
            self.builder.store(value, addr);
        }
        Ok(())
    }

    fn if_stmt(&mut self, if_stmt: &'ast If) -> CResult<()> {
        let then_block = self.builder.append_block("if.then");
        let else_block = match &if_stmt.else_stmt {
            Some(_) => Some(self.builder.append_block("if.else")),
            None => None,
        };
        let end_block = self.builder.append_block("if.end");

        let cond = self.value(&if_stmt.cond)?;
        self.builder
            .cond_branch(cond, then_block, else_block.unwrap_or(end_block));

        self.builder.position_at_end(then_block);
        self.statement(&if_stmt.then_stmt)?;
        self.builder.branch(end_block);

        if let (Some(else_block), Some(else_stmt)) = (else_block, &if_stmt.else_stmt) {
            self.builder.position_at_end(else_block);
            self.statement(else_stmt)?;
            self.builder.branch(end_block);
        }

        self.builder.position_at_end(end_block);
        Ok(())
    }

    fn while_stmt(&mut self, while_stmt: &'ast While) -> CResult<()> {
        let cond_block = self.builder.append_block("while.cond");
        let body_block = self.builder.append_block("while.body");
        let end_block = self.builder.append_block("while.end");

        self.builder.branch(cond_block);
        self.builder.position_at_end(cond_block);
        let cond = self.value(&while_stmt.cond)?;
        self.builder.cond_branch(cond, body_block, end_block);

        self.builder.position_at_end(body_block);
        self.with_break_target(end_block, |generator| {
            generator.statement(&while_stmt.body)
        })?;
        self.builder.branch(cond_block);

        self.builder.position_at_end(end_block);
        Ok(())
    }

    fn for_stmt(&mut self, for_stmt: &'ast For) -> CResult<()> {
        match &for_stmt.init {
            Some(ForInit::Decls(decls)) => {
                for decl in decls {
                    self.local_decl(decl)?;
                }
            }
            Some(ForInit::Expression(init)) => {
                self.value(init)?;
            }
            None => {}
        }

        let cond_block = self.builder.append_block("for.cond");
        let body_block = self.builder.append_block("for.body");
        let inc_block = self.builder.append_block("for.inc");
        let end_block = self.builder.append_block("for.end");

        self.builder.branch(cond_block);
        self.builder.position_at_end(cond_block);
        match &for_stmt.cond {
            Some(cond) => {
                let cond = self.value(cond)?;
                self.builder.cond_branch(cond, body_block, end_block);
            }
            None => self.builder.branch(body_block),
        }

        self.builder.position_at_end(body_block);
        self.with_break_target(end_block, |generator| generator.statement(&for_stmt.body))?;
        self.builder.branch(inc_block);

        self.builder.position_at_end(inc_block);
        if let Some(next) = &for_stmt.next {
            // Evaluated for its side effects only.
            self.value(next)?;
        }
        self.builder.branch(cond_block);

        self.builder.position_at_end(end_block);
        Ok(())
    }

    fn switch_stmt(&mut self, switch: &'ast Switch) -> CResult<()> {
        let case_blocks: Vec<BlockRef> = (0..switch.cases.len())
            .map(|index| self.builder.append_block(&format!("switch.case{index}")))
            .collect();
        let end_block = self.builder.append_block("switch.end");

        let discriminant = self.value(&switch.cond)?;

        // Case labels must fold to integer constants, so collecting them
        // up front emits no instructions.
        let mut cases = vec![];
        for (case, block) in switch.cases.iter().zip(&case_blocks) {
            let Some(expr) = &case.expr else {
                return Err(CodegenError::unsupported(
                    "'default' labels are not supported",
                    &case.coord,
                ));
            };
            let label = self.value(expr)?;
            if !label.is_const() {
                return Err(CodegenError::unsupported(
                    "case label is not an integer constant",
                    expr.coord(),
                ));
            }
            cases.push((label, *block));
        }
        self.builder.switch(discriminant, end_block, cases);

        self.with_break_target(end_block, |generator| {
            for (case, block) in switch.cases.iter().zip(&case_blocks) {
                generator.builder.position_at_end(*block);
                for item in &case.items {
                    generator.block_item(item)?;
                }
                // There is no fall-through: every case closes toward the
                // end block. When the case already broke or returned, this
                // branch lands in the pending dead block.
                generator.builder.branch(end_block);
            }
            Ok(())
        })?;

        self.builder.position_at_end(end_block);
        Ok(())
    }

    fn break_stmt(&mut self, brk: &'ast Break) -> CResult<()> {
        let Some(target) = self.break_targets.last().copied() else {
            return Err(CodegenError::unsupported(
                "'break' outside of a loop or switch",
                &brk.coord,
            ));
        };
        self.builder.branch(target);
        self.position_at_dead_block();
        Ok(())
    }

    fn return_stmt(&mut self, ret: &'ast Return) -> CResult<()> {
        let value = match &ret.expr {
            Some(expr) => Some(self.value(expr)?),
            None => None,
        };
        self.builder.ret(value);
        self.position_at_dead_block();
        Ok(())
    }

    /// After an unconditional terminator the builder still needs a valid
    /// insertion point; park it on a sentinel block that `finish` strips.
    fn position_at_dead_block(&mut self) {
        let dead = self.builder.append_block("dead");
        self.builder.position_at_end(dead);
    }

    fn with_break_target<F>(&mut self, target: BlockRef, f: F) -> CResult<()>
    where
        F: FnOnce(&mut Self) -> CResult<()>,
    {
        self.break_targets.push(target);
        let result = f(self);
        self.break_targets.pop();
        result
    }

    // ----- expressions -----

    /// The r-value of an expression.
    fn value(&mut self, expr: &'ast Expression) -> CResult<Value> {
        match expr {
            Expression::Constant(constant) => self.constant(constant),
            Expression::Ident(ident) => {
                // Enumerator names are constants, not loads.
                if let Some(value) = self.constants.get(&ident.name) {
                    return Ok(const_i32(*value));
                }
                let addr = self.addr(expr)?;
                Ok(self.builder.load(addr))
            }
            Expression::ArrayRef(_) | Expression::StructRef(_) => {
                let addr = self.addr(expr)?;
                Ok(self.builder.load(addr))
            }
            Expression::Binary(binary) => self.binary(binary),
            Expression::Unary(unary) => self.unary(unary),
            Expression::Cast(cast) => self.cast(cast),
            Expression::Call(call) => self.call(call),
            Expression::Assignment(assignment) => self.assignment(assignment),
            Expression::InitList(list) => Err(CodegenError::unsupported(
                "initializer list outside a declaration",
                &list.coord,
            )),
        }
    }

    /// A pointer to the l-value an expression denotes; defined for
    /// identifiers, array subscripts and struct field accesses.
    fn addr(&mut self, expr: &'ast Expression) -> CResult<Value> {
        match expr {
            Expression::Ident(ident) => {
                self.values.get(&ident.name).cloned().ok_or_else(|| {
                    CodegenError::unsupported(
                        format!("'{}' is not addressable", ident.name),
                        &ident.coord,
                    )
                })
            }
            Expression::ArrayRef(array_ref) => {
                let base = self.addr(&array_ref.base)?;
                let Type::Ptr(pointee) = base.ty() else {
                    unreachable!("address of an l-value is not a pointer");
                };
                // An array base decays to a pointer to its first element;
                // a pointer base is loaded.
                let base = match *pointee {
                    Type::Array { elem, .. } => self.builder.bitcast(base, (*elem).ptr()),
                    _ => self.builder.load(base),
                };
                let subscript = self.value(&array_ref.subscript)?;
                Ok(self.builder.gep(base, vec![subscript]))
            }
            Expression::StructRef(struct_ref) => self.struct_ref_addr(struct_ref),
            other => Err(CodegenError::unsupported(
                "expression is not addressable",
                other.coord(),
            )),
        }
    }

    fn struct_ref_addr(&mut self, struct_ref: &'ast StructRef) -> CResult<Value> {
        if struct_ref.op != MemberOp::Dot {
            return Err(CodegenError::unsupported(
                "the '->' operator is not supported",
                &struct_ref.coord,
            ));
        }
        let Expression::Ident(base) = &*struct_ref.base else {
            return Err(CodegenError::unsupported(
                "field access on a non-identifier expression",
                &struct_ref.coord,
            ));
        };

        let Some(Symbol::Decl(decl)) = self.scope.lookup(&base.name) else {
            return Err(CodegenError::unsupported(
                format!("'{}' does not name a struct variable", base.name),
                &base.coord,
            ));
        };
        let TypeNode::Struct(def) = decl.ty.strip_typedecl() else {
            return Err(CodegenError::unsupported(
                format!("'{}' is not a struct", base.name),
                &base.coord,
            ));
        };

        let fields = struct_fields(def, self.scope, &struct_ref.coord)?;
        let field_name = &struct_ref.field.name;
        let Some(index) = fields
            .iter()
            .position(|field| field.name.as_deref() == Some(field_name.as_str()))
        else {
            return Err(CodegenError::unsupported(
                format!("no field '{field_name}' in struct '{}'", def.name),
                &struct_ref.field.coord,
            ));
        };

        let base_addr = self.addr(&struct_ref.base)?;
        Ok(self
            .builder
            .gep(base_addr, vec![const_i32(0), const_i32(index as i64)]))
    }

    fn constant(&mut self, constant: &'ast Constant) -> CResult<Value> {
        match constant.kind {
            ConstantKind::Int => Ok(const_i32(parse_int(&constant.value, &constant.coord)?)),
            ConstantKind::Str => {
                let raw = constant.value.trim_matches('"');
                let Some(text) = unescape::unescape(raw) else {
                    return Err(CodegenError::unsupported(
                        "unsupported escape sequence in string literal",
                        &constant.coord,
                    ));
                };
                let mut bytes = text.into_bytes();
                bytes.push(0);
                let global = self.module.add_string_literal(bytes);
                Ok(Value::BitcastExpr {
                    ty: Type::I8.ptr(),
                    value: Box::new(global),
                })
            }
        }
    }

    fn binary(&mut self, binary: &'ast BinaryExpr) -> CResult<Value> {
        let lhs = self.value(&binary.lhs)?;
        if matches!(binary.op, BinaryOp::And | BinaryOp::Or) {
            return self.short_circuit(binary, lhs);
        }

        let rhs = self.value(&binary.rhs)?;
        Ok(match binary.op {
            BinaryOp::Add => self.builder.add(lhs, rhs),
            BinaryOp::Sub => self.builder.sub(lhs, rhs),
            BinaryOp::Mul => self.builder.mul(lhs, rhs),
            BinaryOp::Div => self.builder.sdiv(lhs, rhs),
            BinaryOp::Lt => self.builder.icmp(Predicate::Slt, lhs, rhs),
            BinaryOp::Gt => self.builder.icmp(Predicate::Sgt, lhs, rhs),
            BinaryOp::Eq => self.builder.icmp(Predicate::Eq, lhs, rhs),
            BinaryOp::Ne => self.builder.icmp(Predicate::Ne, lhs, rhs),
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        })
    }

    fn short_circuit(&mut self, binary: &'ast BinaryExpr, lhs: Value) -> CResult<Value> {
        let prefix = match binary.op {
            BinaryOp::And => "and",
            _ => "or",
        };
        // The φ must name the block that computed each operand, which for
        // a nested short-circuit is not the block the expression started
        // in.
        let lhs_block = self.builder.current_block();
        let rhs_block = self.builder.append_block(&format!("{prefix}.rhs"));
        let end_block = self.builder.append_block(&format!("{prefix}.end"));

        match binary.op {
            BinaryOp::And => self.builder.cond_branch(lhs.clone(), rhs_block, end_block),
            _ => self.builder.cond_branch(lhs.clone(), end_block, rhs_block),
        }

        self.builder.position_at_end(rhs_block);
        let rhs = self.value(&binary.rhs)?;
        let rhs_exit = self.builder.current_block();
        self.builder.branch(end_block);

        self.builder.position_at_end(end_block);
        Ok(self
            .builder
            .phi(Type::I1, vec![(lhs, lhs_block), (rhs, rhs_exit)]))
    }

    fn unary(&mut self, unary: &'ast UnaryExpr) -> CResult<Value> {
        match unary.op {
            UnaryOp::Minus => {
                let value = self.value(&unary.expr)?;
                match value {
                    // Fold the negation into the constant.
                    Value::Const { ty, value } => Ok(Value::Const { ty, value: -value }),
                    other => {
                        let zero = Value::Const {
                            ty: other.ty(),
                            value: 0,
                        };
                        Ok(self.builder.sub(zero, other))
                    }
                }
            }
            UnaryOp::PreInc | UnaryOp::PostInc => {
                let value = self.value(&unary.expr)?;
                let one = Value::Const {
                    ty: value.ty(),
                    value: 1,
                };
                let incremented = self.builder.add(value.clone(), one);
                let slot = self.addr(&unary.expr)?;
                self.builder.store(incremented.clone(), slot);
                Ok(match unary.op {
                    UnaryOp::PreInc => incremented,
                    _ => value,
                })
            }
            UnaryOp::AddressOf => {
                let Expression::Ident(_) = &*unary.expr else {
                    return Err(CodegenError::unsupported(
                        "'&' is only supported on identifiers",
                        &unary.coord,
                    ));
                };
                self.addr(&unary.expr)
            }
        }
    }

    fn cast(&mut self, cast: &'ast CastExpr) -> CResult<Value> {
        let to = lower_type(&cast.to, self.scope, &cast.coord)?;
        if !to.is_ptr() {
            return Err(CodegenError::unsupported(
                "only pointer-to-pointer casts are supported",
                &cast.coord,
            ));
        }
        let value = self.value(&cast.expr)?;
        if !value.ty().is_ptr() {
            return Err(CodegenError::unsupported(
                "only pointer-to-pointer casts are supported",
                &cast.coord,
            ));
        }
        Ok(self.builder.bitcast(value, to))
    }

    fn call(&mut self, call: &'ast FuncCall) -> CResult<Value> {
        let Some(target) = self.module.get_function(&call.name.name) else {
            return Err(CodegenError::unsupported(
                format!("call to unknown function '{}'", call.name.name),
                &call.name.coord,
            ));
        };
        let ty = target.ty.clone();
        let callee = target.name.clone();

        let mut args = Vec::with_capacity(call.args.len());
        for (index, arg) in call.args.iter().enumerate() {
            args.push(self.argument(arg, ty.params.get(index))?);
        }
        Ok(self.builder.call(&callee, &ty, args))
    }

    /// Lower a call argument. An array l-value passed where the formal is
    /// a pointer to its element type decays to the bitcast address.
    fn argument(&mut self, expr: &'ast Expression, formal: Option<&Type>) -> CResult<Value> {
        if let Some(Type::Ptr(formal_elem)) = formal {
            if self.is_lvalue(expr) {
                let addr = self.addr(expr)?;
                return Ok(match addr.ty().pointee() {
                    Some(Type::Array { elem, .. }) if elem == formal_elem => {
                        self.builder.bitcast(addr, Type::Ptr(formal_elem.clone()))
                    }
                    _ => self.builder.load(addr),
                });
            }
        }
        self.value(expr)
    }

    fn is_lvalue(&self, expr: &Expression) -> bool {
        match expr {
            Expression::Ident(ident) => !self.constants.contains_key(&ident.name),
            Expression::ArrayRef(_) | Expression::StructRef(_) => true,
            _ => false,
        }
    }

    fn assignment(&mut self, assignment: &'ast Assignment) -> CResult<Value> {
        let rhs = self.value(&assignment.rvalue)?;
        let lhs = self.addr(&assignment.lvalue)?;
        self.builder.store(rhs.clone(), lhs);
        // Assignment is an expression; it yields the stored value.
        Ok(rhs)
    }
}

fn const_i32(value: i64) -> Value {
    Value::Const {
        ty: Type::I32,
        value,
    }
}

/// Names of the blocks reachable from the entry block.
fn reachable_blocks(function: &ir::Function) -> HashSet<String> {
    let mut reachable = HashSet::new();
    let Some(entry) = function.blocks.first() else {
        return reachable;
    };
    let mut queue = vec![entry.name.clone()];
    while let Some(name) = queue.pop() {
        if !reachable.insert(name.clone()) {
            continue;
        }
        let Some(block) = function.blocks.iter().find(|block| block.name == name) else {
            continue;
        };
        for instruction in &block.instructions {
            match instruction {
                Instruction::Branch { dest } => queue.push(dest.clone()),
                Instruction::CondBranch {
                    then_dest,
                    else_dest,
                    ..
                } => {
                    queue.push(then_dest.clone());
                    queue.push(else_dest.clone());
                }
                Instruction::Switch { default, cases, .. } => {
                    queue.push(default.clone());
                    for (_, dest) in cases {
                        queue.push(dest.clone());
                    }
                }
                _ => {}
            }
        }
    }
    reachable
}
