//! Conversion of lang-c's C11 AST into the contract AST.
//!
//! The main work is folding lang-c's declarator lists back into type
//! trees (`int *p[3]` → array of pointer to int) and grouping the labeled
//! statements of a switch body into case nodes.
use lang_c::ast as c;
use lang_c::driver::Parse;
use lang_c::span::{Node, Span};

use crate::ast::{
    ArrayDecl, ArrayRef, Assignment, BinaryExpr, BinaryOp, BlockItem, Break, Case, CastExpr,
    Compound, Constant, ConstantKind, Coord, Decl, Enumerator, EnumType, Expression, ExternalDecl,
    For, ForInit, FuncCall, FuncDecl, FuncDef, Ident, IdentifierType, If, InitList, MemberOp,
    Param, PtrDecl, Return, Statement, Storage, StructRef, StructType, Switch, TranslationUnit,
    TypeDecl, TypeNode, Typedef, UnaryExpr, UnaryOp, While,
};

use super::ParseError;

type PResult<T> = Result<T, ParseError>;

pub(super) fn unit(parse: &Parse, file: &str) -> PResult<TranslationUnit> {
    let converter = Converter::new(&parse.source, file);
    let mut items = vec![];
    for declaration in &parse.unit.0 {
        match &declaration.node {
            c::ExternalDeclaration::Declaration(node) => {
                converter.top_level(&node.node, node.span, &mut items)?;
            }
            c::ExternalDeclaration::FunctionDefinition(node) => {
                items.push(ExternalDecl::FuncDef(
                    converter.function_definition(&node.node, node.span)?,
                ));
            }
            _ => {
                return Err(ParseError::unsupported(
                    "unsupported top-level construct",
                    converter.coord(declaration.span),
                ));
            }
        }
    }
    Ok(TranslationUnit {
        items,
        coord: Coord::new(file, 1, 1),
    })
}

struct Converter {
    file: String,
    line_starts: Vec<usize>,
}

impl Converter {
    fn new(source: &str, file: &str) -> Converter {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Converter {
            file: file.to_owned(),
            line_starts,
        }
    }

    /// Line and column of a node, computed from its byte offset into the
    /// preprocessed source.
    fn coord(&self, span: Span) -> Coord {
        let line = self.line_starts.partition_point(|start| *start <= span.start);
        let column = span.start - self.line_starts[line - 1] + 1;
        Coord::new(&self.file, line, column)
    }

    // ----- declarations -----

    fn top_level(
        &self,
        declaration: &c::Declaration,
        span: Span,
        items: &mut Vec<ExternalDecl>,
    ) -> PResult<()> {
        let coord = self.coord(span);
        let (storage, typedef, core) = self.declaration_specifiers(&declaration.specifiers, &coord)?;

        if declaration.declarators.is_empty() {
            items.push(ExternalDecl::Decl(Decl {
                name: None,
                storage,
                ty: core,
                init: None,
                coord,
            }));
            return Ok(());
        }

        for init_declarator in &declaration.declarators {
            let declarator = &init_declarator.node.declarator;
            let (name, ty) = self.apply_declarator(declarator, core.clone())?;
            let coord = self.coord(declarator.span);

            if typedef {
                let Some(name) = name else {
                    return Err(ParseError::unsupported("typedef without a name", coord));
                };
                items.push(ExternalDecl::Typedef(Typedef { name, coord }));
                continue;
            }

            let init = match &init_declarator.node.initializer {
                Some(node) => Some(self.initializer(&node.node, node.span)?),
                None => None,
            };
            items.push(ExternalDecl::Decl(Decl {
                name,
                storage: storage.clone(),
                ty,
                init,
                coord,
            }));
        }
        Ok(())
    }

    /// A declaration in statement position; may bind several names.
    fn declaration_decls(&self, declaration: &c::Declaration, span: Span) -> PResult<Vec<Decl>> {
        let coord = self.coord(span);
        let (storage, typedef, core) = self.declaration_specifiers(&declaration.specifiers, &coord)?;
        if typedef {
            return Err(ParseError::unsupported(
                "typedef inside a function is not supported",
                coord,
            ));
        }

        if declaration.declarators.is_empty() {
            return Ok(vec![Decl {
                name: None,
                storage,
                ty: core,
                init: None,
                coord,
            }]);
        }

        let mut decls = vec![];
        for init_declarator in &declaration.declarators {
            let declarator = &init_declarator.node.declarator;
            let (name, ty) = self.apply_declarator(declarator, core.clone())?;
            let init = match &init_declarator.node.initializer {
                Some(node) => Some(self.initializer(&node.node, node.span)?),
                None => None,
            };
            decls.push(Decl {
                name,
                storage: storage.clone(),
                ty,
                init,
                coord: self.coord(declarator.span),
            });
        }
        Ok(decls)
    }

    fn function_definition(&self, def: &c::FunctionDefinition, span: Span) -> PResult<FuncDef> {
        let coord = self.coord(span);
        if !def.declarations.is_empty() {
            return Err(ParseError::unsupported(
                "K&R parameter declarations are not supported",
                coord,
            ));
        }
        let (storage, typedef, core) = self.declaration_specifiers(&def.specifiers, &coord)?;
        if typedef {
            return Err(ParseError::unsupported("typedef on a function definition", coord));
        }
        let (name, ty) = self.apply_declarator(&def.declarator, core)?;
        if !matches!(ty, TypeNode::Func(_)) {
            return Err(ParseError::unsupported("expected a function declarator", coord));
        }

        let body = match &def.statement.node {
            c::Statement::Compound(items) => {
                self.compound(items, self.coord(def.statement.span))?
            }
            _ => {
                return Err(ParseError::unsupported(
                    "function body must be a block",
                    self.coord(def.statement.span),
                ));
            }
        };

        Ok(FuncDef {
            decl: Decl {
                name,
                storage,
                ty,
                init: None,
                coord: self.coord(def.declarator.span),
            },
            body,
            coord,
        })
    }

    // ----- specifiers and declarators -----

    fn declaration_specifiers(
        &self,
        specifiers: &[Node<c::DeclarationSpecifier>],
        coord: &Coord,
    ) -> PResult<(Vec<Storage>, bool, TypeNode)> {
        let mut storage = vec![];
        let mut typedef = false;
        let mut types = vec![];
        for specifier in specifiers {
            match &specifier.node {
                c::DeclarationSpecifier::StorageClass(class) => match &class.node {
                    c::StorageClassSpecifier::Typedef => typedef = true,
                    c::StorageClassSpecifier::Extern => storage.push(Storage::Extern),
                    c::StorageClassSpecifier::Static => storage.push(Storage::Static),
                    c::StorageClassSpecifier::Auto => storage.push(Storage::Auto),
                    c::StorageClassSpecifier::Register => storage.push(Storage::Register),
                    _ => {
                        return Err(ParseError::unsupported(
                            "unsupported storage class",
                            self.coord(class.span),
                        ));
                    }
                },
                c::DeclarationSpecifier::TypeSpecifier(specifier) => types.push(specifier),
                // Qualifiers (const, volatile) and function specifiers
                // (inline) carry no meaning in this subset.
                _ => {}
            }
        }
        let core = self.type_from_specifiers(&types, coord)?;
        Ok((storage, typedef, core))
    }

    fn type_from_specifiers(
        &self,
        types: &[&Node<c::TypeSpecifier>],
        coord: &Coord,
    ) -> PResult<TypeNode> {
        if let [specifier] = types {
            match &specifier.node {
                c::TypeSpecifier::Struct(node) => {
                    return self.struct_type(&node.node, node.span);
                }
                c::TypeSpecifier::Enum(node) => return self.enum_type(&node.node, node.span),
                c::TypeSpecifier::TypedefName(id) => {
                    // Typedef'd names reach the lowering pass, which
                    // rejects them as unsupported types.
                    return Ok(TypeNode::Identifier(IdentifierType {
                        name: id.node.name.clone(),
                    }));
                }
                _ => {}
            }
        }

        let mut names = vec![];
        for specifier in types {
            names.push(match &specifier.node {
                c::TypeSpecifier::Void => "void",
                c::TypeSpecifier::Char => "char",
                c::TypeSpecifier::Short => "short",
                c::TypeSpecifier::Int => "int",
                c::TypeSpecifier::Long => "long",
                c::TypeSpecifier::Float => "float",
                c::TypeSpecifier::Double => "double",
                c::TypeSpecifier::Signed => "signed",
                c::TypeSpecifier::Unsigned => "unsigned",
                c::TypeSpecifier::Bool => "_Bool",
                _ => {
                    return Err(ParseError::unsupported(
                        "unsupported type specifier",
                        self.coord(specifier.span),
                    ));
                }
            });
        }
        if names.is_empty() {
            return Err(ParseError::unsupported(
                "declaration without a type",
                coord.clone(),
            ));
        }
        Ok(TypeNode::Identifier(IdentifierType {
            name: names.join(" "),
        }))
    }

    fn struct_type(&self, def: &c::StructType, span: Span) -> PResult<TypeNode> {
        let coord = self.coord(span);
        if !matches!(def.kind.node, c::StructKind::Struct) {
            return Err(ParseError::unsupported("unions are not supported", coord));
        }
        let Some(identifier) = &def.identifier else {
            return Err(ParseError::unsupported(
                "anonymous structs are not supported",
                coord,
            ));
        };

        let fields = match &def.declarations {
            None => None,
            Some(declarations) => {
                let mut fields = vec![];
                for declaration in declarations {
                    match &declaration.node {
                        c::StructDeclaration::Field(field) => {
                            self.struct_fields(&field.node, field.span, &mut fields)?;
                        }
                        _ => {
                            return Err(ParseError::unsupported(
                                "unsupported struct member",
                                self.coord(declaration.span),
                            ));
                        }
                    }
                }
                Some(fields)
            }
        };

        Ok(TypeNode::Struct(StructType {
            name: identifier.node.name.clone(),
            fields,
            coord,
        }))
    }

    fn struct_fields(
        &self,
        field: &c::StructField,
        span: Span,
        out: &mut Vec<Decl>,
    ) -> PResult<()> {
        let coord = self.coord(span);
        let mut types = vec![];
        for specifier in &field.specifiers {
            if let c::SpecifierQualifier::TypeSpecifier(ts) = &specifier.node {
                types.push(ts);
            }
        }
        let core = self.type_from_specifiers(&types, &coord)?;

        for declarator in &field.declarators {
            let field = &declarator.node;
            if field.bit_width.is_some() {
                return Err(ParseError::unsupported(
                    "bitfields are not supported",
                    self.coord(declarator.span),
                ));
            }
            let Some(inner) = &field.declarator else {
                return Err(ParseError::unsupported(
                    "unnamed struct field",
                    self.coord(declarator.span),
                ));
            };
            let (name, ty) = self.apply_declarator(inner, core.clone())?;
            out.push(Decl {
                name,
                storage: vec![],
                ty,
                init: None,
                coord: self.coord(inner.span),
            });
        }
        Ok(())
    }

    fn enum_type(&self, def: &c::EnumType, span: Span) -> PResult<TypeNode> {
        let coord = self.coord(span);
        let Some(identifier) = &def.identifier else {
            return Err(ParseError::unsupported(
                "anonymous enums are not supported",
                coord,
            ));
        };

        let values = if def.enumerators.is_empty() {
            None
        } else {
            let mut values = vec![];
            for enumerator in &def.enumerators {
                if enumerator.node.expression.is_some() {
                    return Err(ParseError::unsupported(
                        "explicit enumerator values are not supported",
                        self.coord(enumerator.span),
                    ));
                }
                values.push(Enumerator {
                    name: enumerator.node.identifier.node.name.clone(),
                    coord: self.coord(enumerator.span),
                });
            }
            Some(values)
        };

        Ok(TypeNode::Enum(EnumType {
            name: identifier.node.name.clone(),
            values,
            coord,
        }))
    }

    /// Fold a declarator around its core type: the core is wrapped in a
    /// `TypeDecl` carrying the declared name, derived declarators apply
    /// inside-out, and parenthesized declarators recurse.
    fn apply_declarator(
        &self,
        declarator: &Node<c::Declarator>,
        core: TypeNode,
    ) -> PResult<(Option<String>, TypeNode)> {
        let declname = declarator_name(&declarator.node);
        let wrapped = TypeNode::TypeDecl(TypeDecl {
            declname,
            ty: Box::new(core),
        });
        self.fold_declarator(&declarator.node, wrapped)
    }

    fn fold_declarator(
        &self,
        declarator: &c::Declarator,
        mut ty: TypeNode,
    ) -> PResult<(Option<String>, TypeNode)> {
        for derived in &declarator.derived {
            ty = self.apply_derived(&derived.node, ty, derived.span)?;
        }
        match &declarator.kind.node {
            c::DeclaratorKind::Abstract => Ok((None, ty)),
            c::DeclaratorKind::Identifier(id) => Ok((Some(id.node.name.clone()), ty)),
            c::DeclaratorKind::Declarator(inner) => self.fold_declarator(&inner.node, ty),
        }
    }

    fn apply_derived(
        &self,
        derived: &c::DerivedDeclarator,
        ty: TypeNode,
        span: Span,
    ) -> PResult<TypeNode> {
        match derived {
            c::DerivedDeclarator::Pointer(_) => Ok(TypeNode::Ptr(PtrDecl { ty: Box::new(ty) })),
            c::DerivedDeclarator::Array(array) => {
                let dim = match &array.node.size {
                    c::ArraySize::Unknown => None,
                    c::ArraySize::VariableExpression(expr) => {
                        Some(Box::new(self.expression(expr)?))
                    }
                    c::ArraySize::StaticExpression(expr) => {
                        Some(Box::new(self.expression(expr)?))
                    }
                    c::ArraySize::VariableUnknown => {
                        return Err(ParseError::unsupported(
                            "variable-length arrays are not supported",
                            self.coord(span),
                        ));
                    }
                };
                Ok(TypeNode::Array(ArrayDecl {
                    ty: Box::new(ty),
                    dim,
                }))
            }
            c::DerivedDeclarator::Function(func) => {
                let mut params = vec![];
                for parameter in &func.node.parameters {
                    params.push(Param::Named(
                        self.parameter(&parameter.node, parameter.span)?,
                    ));
                }
                if matches!(func.node.ellipsis, c::Ellipsis::Some) {
                    params.push(Param::Ellipsis);
                }
                Ok(TypeNode::Func(FuncDecl {
                    ret: Box::new(ty),
                    params,
                }))
            }
            c::DerivedDeclarator::KRFunction(identifiers) if identifiers.is_empty() => {
                // `int f()` — an empty parameter list.
                Ok(TypeNode::Func(FuncDecl {
                    ret: Box::new(ty),
                    params: vec![],
                }))
            }
            _ => Err(ParseError::unsupported(
                "unsupported declarator",
                self.coord(span),
            )),
        }
    }

    fn parameter(&self, parameter: &c::ParameterDeclaration, span: Span) -> PResult<Decl> {
        let coord = self.coord(span);
        let (storage, typedef, core) = self.declaration_specifiers(&parameter.specifiers, &coord)?;
        if typedef {
            return Err(ParseError::unsupported("typedef in a parameter list", coord));
        }
        match &parameter.declarator {
            None => Ok(Decl {
                name: None,
                storage,
                ty: TypeNode::TypeDecl(TypeDecl {
                    declname: None,
                    ty: Box::new(core),
                }),
                init: None,
                coord,
            }),
            Some(declarator) => {
                let (name, ty) = self.apply_declarator(declarator, core)?;
                Ok(Decl {
                    name,
                    storage,
                    ty,
                    init: None,
                    coord,
                })
            }
        }
    }

    fn initializer(&self, initializer: &c::Initializer, span: Span) -> PResult<Expression> {
        match initializer {
            c::Initializer::Expression(expr) => self.expression(expr),
            c::Initializer::List(items) => {
                let coord = self.coord(span);
                let mut exprs = vec![];
                for item in items {
                    if !item.node.designation.is_empty() {
                        return Err(ParseError::unsupported(
                            "designated initializers are not supported",
                            self.coord(item.span),
                        ));
                    }
                    let inner = &item.node.initializer;
                    exprs.push(self.initializer(&inner.node, inner.span)?);
                }
                Ok(Expression::InitList(InitList { exprs, coord }))
            }
        }
    }

    // ----- statements -----

    fn statement(&self, stmt: &c::Statement, span: Span) -> PResult<Statement> {
        let coord = self.coord(span);
        match stmt {
            c::Statement::Compound(items) => Ok(Statement::Compound(self.compound(items, coord)?)),
            c::Statement::Expression(None) => Ok(Statement::Empty),
            c::Statement::Expression(Some(expr)) => {
                Ok(Statement::Expression(self.expression(expr)?))
            }
            c::Statement::If(node) => {
                let if_stmt = &node.node;
                let then_stmt = self.statement(&if_stmt.then_statement.node, if_stmt.then_statement.span)?;
                let else_stmt = match &if_stmt.else_statement {
                    Some(stmt) => Some(Box::new(self.statement(&stmt.node, stmt.span)?)),
                    None => None,
                };
                Ok(Statement::If(If {
                    cond: self.expression(&if_stmt.condition)?,
                    then_stmt: Box::new(then_stmt),
                    else_stmt,
                    coord,
                }))
            }
            c::Statement::While(node) => {
                let while_stmt = &node.node;
                Ok(Statement::While(While {
                    cond: self.expression(&while_stmt.expression)?,
                    body: Box::new(
                        self.statement(&while_stmt.statement.node, while_stmt.statement.span)?,
                    ),
                    coord,
                }))
            }
            c::Statement::For(node) => {
                let for_stmt = &node.node;
                let init = match &for_stmt.initializer.node {
                    c::ForInitializer::Empty => None,
                    c::ForInitializer::Expression(expr) => {
                        Some(ForInit::Expression(self.expression(expr)?))
                    }
                    c::ForInitializer::Declaration(declaration) => Some(ForInit::Decls(
                        self.declaration_decls(&declaration.node, declaration.span)?,
                    )),
                    _ => {
                        return Err(ParseError::unsupported(
                            "unsupported for-loop initializer",
                            self.coord(for_stmt.initializer.span),
                        ));
                    }
                };
                let cond = match &for_stmt.condition {
                    Some(expr) => Some(self.expression(expr)?),
                    None => None,
                };
                let next = match &for_stmt.step {
                    Some(expr) => Some(self.expression(expr)?),
                    None => None,
                };
                Ok(Statement::For(For {
                    init,
                    cond,
                    next,
                    body: Box::new(
                        self.statement(&for_stmt.statement.node, for_stmt.statement.span)?,
                    ),
                    coord,
                }))
            }
            c::Statement::Switch(node) => self.switch(&node.node, coord),
            c::Statement::Break => Ok(Statement::Break(Break { coord })),
            c::Statement::Return(expr) => {
                let expr = match expr {
                    Some(expr) => Some(self.expression(expr)?),
                    None => None,
                };
                Ok(Statement::Return(Return { expr, coord }))
            }
            c::Statement::Continue => Err(ParseError::unsupported(
                "'continue' is not supported",
                coord,
            )),
            c::Statement::DoWhile(_) => Err(ParseError::unsupported(
                "'do' loops are not supported",
                coord,
            )),
            c::Statement::Goto(_) => Err(ParseError::unsupported("'goto' is not supported", coord)),
            c::Statement::Labeled(_) => Err(ParseError::unsupported(
                "labels are only supported inside a switch",
                coord,
            )),
            _ => Err(ParseError::unsupported("unsupported statement", coord)),
        }
    }

    fn compound(&self, items: &[Node<c::BlockItem>], coord: Coord) -> PResult<Compound> {
        let mut out = vec![];
        for item in items {
            match &item.node {
                c::BlockItem::Declaration(declaration) => {
                    for decl in self.declaration_decls(&declaration.node, declaration.span)? {
                        out.push(BlockItem::Decl(decl));
                    }
                }
                c::BlockItem::Statement(stmt) => {
                    out.push(BlockItem::Statement(self.statement(&stmt.node, stmt.span)?));
                }
                _ => {
                    return Err(ParseError::unsupported(
                        "unsupported block item",
                        self.coord(item.span),
                    ));
                }
            }
        }
        Ok(Compound { items: out, coord })
    }

    /// Re-group the flat labeled statements of a switch body into case
    /// nodes, flattening chained labels (`case 1: case 2: …`).
    fn switch(&self, switch: &c::SwitchStatement, coord: Coord) -> PResult<Statement> {
        let cond = self.expression(&switch.expression)?;
        let c::Statement::Compound(items) = &switch.statement.node else {
            return Err(ParseError::unsupported(
                "switch body must be a block",
                self.coord(switch.statement.span),
            ));
        };

        let mut cases: Vec<Case> = vec![];
        for item in items {
            match &item.node {
                c::BlockItem::Statement(stmt) => self.switch_item(stmt, &mut cases)?,
                c::BlockItem::Declaration(declaration) => {
                    let Some(current) = cases.last_mut() else {
                        return Err(ParseError::unsupported(
                            "declaration before the first case label",
                            self.coord(item.span),
                        ));
                    };
                    for decl in self.declaration_decls(&declaration.node, declaration.span)? {
                        current.items.push(BlockItem::Decl(decl));
                    }
                }
                _ => {
                    return Err(ParseError::unsupported(
                        "unsupported block item",
                        self.coord(item.span),
                    ));
                }
            }
        }

        Ok(Statement::Switch(Switch { cond, cases, coord }))
    }

    fn switch_item(&self, stmt: &Node<c::Statement>, cases: &mut Vec<Case>) -> PResult<()> {
        match &stmt.node {
            c::Statement::Labeled(labeled) => {
                let coord = self.coord(stmt.span);
                let expr = match &labeled.node.label.node {
                    c::Label::Case(expr) => Some(self.expression(expr)?),
                    c::Label::Default => None,
                    _ => {
                        return Err(ParseError::unsupported(
                            "unsupported label in a switch body",
                            coord,
                        ));
                    }
                };
                cases.push(Case {
                    expr,
                    items: vec![],
                    coord,
                });
                self.switch_item(&labeled.node.statement, cases)
            }
            c::Statement::Expression(None) => Ok(()),
            other => {
                let Some(current) = cases.last_mut() else {
                    return Err(ParseError::unsupported(
                        "statement before the first case label",
                        self.coord(stmt.span),
                    ));
                };
                current
                    .items
                    .push(BlockItem::Statement(self.statement(other, stmt.span)?));
                Ok(())
            }
        }
    }

    // ----- expressions -----

    fn expression(&self, expr: &Node<c::Expression>) -> PResult<Expression> {
        let coord = self.coord(expr.span);
        match &expr.node {
            c::Expression::Identifier(id) => Ok(Expression::Ident(Ident {
                name: id.node.name.clone(),
                coord,
            })),
            c::Expression::Constant(constant) => self.constant(&constant.node, coord),
            c::Expression::StringLiteral(literal) => {
                // Adjacent pieces concatenate into one quoted spelling.
                let mut value = String::from("\"");
                for part in literal.node.iter() {
                    value.push_str(part.trim_matches('"'));
                }
                value.push('"');
                Ok(Expression::Constant(Constant {
                    kind: ConstantKind::Str,
                    value,
                    coord,
                }))
            }
            c::Expression::Member(member) => {
                let op = match member.node.operator.node {
                    c::MemberOperator::Direct => MemberOp::Dot,
                    c::MemberOperator::Indirect => MemberOp::Arrow,
                };
                Ok(Expression::StructRef(StructRef {
                    base: Box::new(self.expression(&member.node.expression)?),
                    op,
                    field: Ident {
                        name: member.node.identifier.node.name.clone(),
                        coord: self.coord(member.node.identifier.span),
                    },
                    coord,
                }))
            }
            c::Expression::Call(call) => {
                let c::Expression::Identifier(callee) = &call.node.callee.node else {
                    return Err(ParseError::unsupported(
                        "calls through expressions are not supported",
                        coord,
                    ));
                };
                let mut args = vec![];
                for arg in &call.node.arguments {
                    args.push(self.expression(arg)?);
                }
                Ok(Expression::Call(FuncCall {
                    name: Ident {
                        name: callee.node.name.clone(),
                        coord: self.coord(call.node.callee.span),
                    },
                    args,
                    coord,
                }))
            }
            c::Expression::UnaryOperator(unary) => {
                let op = match unary.node.operator.node {
                    c::UnaryOperator::Minus => UnaryOp::Minus,
                    c::UnaryOperator::PostIncrement => UnaryOp::PostInc,
                    c::UnaryOperator::PreIncrement => UnaryOp::PreInc,
                    c::UnaryOperator::Address => UnaryOp::AddressOf,
                    _ => {
                        return Err(ParseError::unsupported(
                            "unsupported unary operator",
                            coord,
                        ));
                    }
                };
                Ok(Expression::Unary(UnaryExpr {
                    op,
                    expr: Box::new(self.expression(&unary.node.operand)?),
                    coord,
                }))
            }
            c::Expression::Cast(cast) => Ok(Expression::Cast(CastExpr {
                to: self.type_name(&cast.node.type_name)?,
                expr: Box::new(self.expression(&cast.node.expression)?),
                coord,
            })),
            c::Expression::BinaryOperator(binary) => self.binary(&binary.node, coord),
            _ => Err(ParseError::unsupported("unsupported expression", coord)),
        }
    }

    fn binary(&self, binary: &c::BinaryOperatorExpression, coord: Coord) -> PResult<Expression> {
        let lhs = Box::new(self.expression(&binary.lhs)?);
        let rhs = Box::new(self.expression(&binary.rhs)?);
        let op = match binary.operator.node {
            c::BinaryOperator::Index => {
                return Ok(Expression::ArrayRef(ArrayRef {
                    base: lhs,
                    subscript: rhs,
                    coord,
                }));
            }
            c::BinaryOperator::Assign => {
                return Ok(Expression::Assignment(Assignment {
                    lvalue: lhs,
                    rvalue: rhs,
                    coord,
                }));
            }
            c::BinaryOperator::Plus => BinaryOp::Add,
            c::BinaryOperator::Minus => BinaryOp::Sub,
            c::BinaryOperator::Multiply => BinaryOp::Mul,
            c::BinaryOperator::Divide => BinaryOp::Div,
            c::BinaryOperator::Less => BinaryOp::Lt,
            c::BinaryOperator::Greater => BinaryOp::Gt,
            c::BinaryOperator::Equals => BinaryOp::Eq,
            c::BinaryOperator::NotEquals => BinaryOp::Ne,
            c::BinaryOperator::LogicalAnd => BinaryOp::And,
            c::BinaryOperator::LogicalOr => BinaryOp::Or,
            _ => {
                return Err(ParseError::unsupported(
                    "unsupported binary operator",
                    coord,
                ));
            }
        };
        Ok(Expression::Binary(BinaryExpr {
            op,
            lhs,
            rhs,
            coord,
        }))
    }

    fn constant(&self, constant: &c::Constant, coord: Coord) -> PResult<Expression> {
        match constant {
            c::Constant::Integer(integer) => {
                // Reattach the base prefix; literal suffixes are dropped,
                // the subset has plain i32 only.
                let value = match integer.base {
                    c::IntegerBase::Decimal => integer.number.to_string(),
                    c::IntegerBase::Octal => format!("0{}", integer.number),
                    c::IntegerBase::Hexadecimal => format!("0x{}", integer.number),
                    _ => {
                        return Err(ParseError::unsupported(
                            "unsupported integer literal",
                            coord,
                        ));
                    }
                };
                Ok(Expression::Constant(Constant {
                    kind: ConstantKind::Int,
                    value,
                    coord,
                }))
            }
            c::Constant::Float(_) => Err(ParseError::unsupported(
                "floating point literals are not supported",
                coord,
            )),
            c::Constant::Character(_) => Err(ParseError::unsupported(
                "character literals are not supported",
                coord,
            )),
        }
    }

    fn type_name(&self, type_name: &Node<c::TypeName>) -> PResult<TypeNode> {
        let coord = self.coord(type_name.span);
        let mut types = vec![];
        for specifier in &type_name.node.specifiers {
            if let c::SpecifierQualifier::TypeSpecifier(ts) = &specifier.node {
                types.push(ts);
            }
        }
        let core = self.type_from_specifiers(&types, &coord)?;
        match &type_name.node.declarator {
            None => Ok(TypeNode::TypeDecl(TypeDecl {
                declname: None,
                ty: Box::new(core),
            })),
            Some(declarator) => {
                let (_, ty) = self.apply_declarator(declarator, core)?;
                Ok(ty)
            }
        }
    }
}

fn declarator_name(declarator: &c::Declarator) -> Option<String> {
    match &declarator.kind.node {
        c::DeclaratorKind::Identifier(id) => Some(id.node.name.clone()),
        c::DeclaratorKind::Declarator(inner) => declarator_name(&inner.node),
        c::DeclaratorKind::Abstract => None,
    }
}
