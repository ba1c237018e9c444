//! Recursive descent parser for the Kotlin subset around view access.
//!
//! The parser is deliberately not a full Kotlin frontend: it covers the
//! declaration and expression shapes fragment- and activity-style classes
//! use. Anything outside the subset is a parse error, which aborts the
//! migration before any rewrite is planned.

use super::error::{ParseError, ParseResult};
use super::lexer::{Lexer, LexicalToken, Token};
use crate::ast::*;
use crate::error::Result;

/// Parser for Kotlin source files
pub struct Parser {
    tokens: Vec<LexicalToken>,
    current: usize,
}

impl Parser {
    /// Create a new parser from source code
    pub fn new(source: &str) -> Result<Self> {
        let tokens = Lexer::new(source)
            .tokenize()
            .map_err(|message| crate::error::Error::Lexical { message })?;
        Ok(Self { tokens, current: 0 })
    }

    /// Parse the source code into a [`KtFile`]
    pub fn parse(mut self) -> Result<KtFile> {
        if self.tokens.is_empty() {
            let span = Span::single(Location::start());
            return Ok(KtFile { package_decl: None, imports: Vec::new(), classes: Vec::new(), span });
        }

        let start = self.tokens[0].location;

        let package_decl = if self.check(&Token::Package) {
            Some(self.parse_package_decl()?)
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.check(&Token::Import) {
            imports.push(self.parse_import_decl()?);
        }

        let mut classes = Vec::new();
        while !self.is_at_end() {
            let decl_start = self.current_location();
            let annotations = self.parse_annotations()?;
            let modifiers = self.parse_modifiers();
            if self.check(&Token::Class) {
                classes.push(self.parse_class(annotations, modifiers, decl_start)?);
            } else {
                return Err(ParseError::invalid_syntax(
                    "expected a class declaration at top level",
                    self.current_location(),
                )
                .into());
            }
        }

        let end = self.previous_end();
        Ok(KtFile {
            package_decl,
            imports,
            classes,
            span: Span::new(start, end),
        })
    }

    // Token helpers

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn peek(&self) -> Option<&LexicalToken> {
        self.tokens.get(self.current)
    }

    fn peek_at(&self, offset: usize) -> Option<&LexicalToken> {
        self.tokens.get(self.current + offset)
    }

    fn check(&self, token_type: &Token) -> bool {
        self.peek().map(|t| t.is(token_type)).unwrap_or(false)
    }

    fn check_at(&self, offset: usize, token_type: &Token) -> bool {
        self.peek_at(offset).map(|t| t.is(token_type)).unwrap_or(false)
    }

    /// Check for a contextual (soft) keyword like `get` or `vararg`
    fn check_soft(&self, word: &str) -> bool {
        self.peek()
            .map(|t| t.is(&Token::Identifier) && t.lexeme == word)
            .unwrap_or(false)
    }

    fn advance(&mut self) -> LexicalToken {
        let token = self.tokens[self.current].clone();
        self.current += 1;
        token
    }

    fn match_token(&mut self, token_type: &Token) -> bool {
        if self.check(token_type) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn consume(&mut self, token_type: &Token, expected: &str) -> ParseResult<LexicalToken> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(self.expected_error(expected))
        }
    }

    fn consume_identifier(&mut self, expected: &str) -> ParseResult<LexicalToken> {
        self.consume(&Token::Identifier, expected)
    }

    fn expected_error(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::unexpected_token(expected, &token.lexeme, token.location),
            None => ParseError::unexpected_end_of_input(expected, self.previous_end()),
        }
    }

    fn current_location(&self) -> Location {
        self.peek().map(|t| t.location).unwrap_or_else(|| self.previous_end())
    }

    fn previous_end(&self) -> Location {
        if self.current == 0 {
            self.tokens.first().map(|t| t.location).unwrap_or_else(Location::start)
        } else {
            self.tokens[self.current - 1].end
        }
    }

    fn span_from(&self, start: Location) -> Span {
        Span::new(start, self.previous_end())
    }

    // Declarations

    fn parse_package_decl(&mut self) -> ParseResult<PackageDecl> {
        let start = self.current_location();
        self.consume(&Token::Package, "package")?;
        let (name, _) = self.parse_dotted_name()?;
        self.match_token(&Token::Semicolon);
        Ok(PackageDecl { name, span: self.span_from(start) })
    }

    fn parse_import_decl(&mut self) -> ParseResult<ImportDecl> {
        let start = self.current_location();
        self.consume(&Token::Import, "import")?;
        let mut path = self.consume_identifier("import path")?.lexeme;
        let mut is_wildcard = false;
        while self.match_token(&Token::Dot) {
            if self.match_token(&Token::Star) {
                is_wildcard = true;
                break;
            }
            let segment = self.consume_identifier("import path segment")?;
            path.push('.');
            path.push_str(&segment.lexeme);
        }
        if self.match_token(&Token::As) {
            // import alias, recorded nowhere because synthetics are never aliased
            self.consume_identifier("import alias")?;
        }
        self.match_token(&Token::Semicolon);
        Ok(ImportDecl { path, is_wildcard, span: self.span_from(start) })
    }

    fn parse_dotted_name(&mut self) -> ParseResult<(String, Span)> {
        let start = self.current_location();
        let mut name = self.consume_identifier("name")?.lexeme;
        while self.check(&Token::Dot) && self.check_at(1, &Token::Identifier) {
            self.advance();
            let segment = self.advance();
            name.push('.');
            name.push_str(&segment.lexeme);
        }
        Ok((name, self.span_from(start)))
    }

    fn parse_annotations(&mut self) -> ParseResult<Vec<String>> {
        let mut annotations = Vec::new();
        while self.match_token(&Token::At) {
            let (mut name, _) = self.parse_dotted_name()?;
            // use-site target such as `@file:` or `@get:`
            if self.check(&Token::Colon)
                && matches!(name.as_str(), "file" | "get" | "set" | "field" | "property" | "param" | "receiver")
            {
                self.advance();
                let (real, _) = self.parse_dotted_name()?;
                name = real;
            }
            if self.check(&Token::LParen) {
                self.consume_balanced(&Token::LParen, &Token::RParen)?;
            }
            annotations.push(name);
        }
        Ok(annotations)
    }

    fn parse_modifiers(&mut self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        loop {
            let modifier = match self.peek().map(|t| &t.token) {
                Some(Token::Public) => Modifier::Public,
                Some(Token::Private) => Modifier::Private,
                Some(Token::Protected) => Modifier::Protected,
                Some(Token::Internal) => Modifier::Internal,
                Some(Token::Open) => Modifier::Open,
                Some(Token::Abstract) => Modifier::Abstract,
                Some(Token::Final) => Modifier::Final,
                Some(Token::Override) => Modifier::Override,
                Some(Token::Lateinit) => Modifier::Lateinit,
                Some(Token::Inner) => Modifier::Inner,
                Some(Token::Data) => Modifier::Data,
                _ => break,
            };
            self.advance();
            modifiers.push(modifier);
        }
        modifiers
    }

    fn parse_class(
        &mut self,
        annotations: Vec<String>,
        modifiers: Vec<Modifier>,
        start: Location,
    ) -> ParseResult<KtClass> {
        self.consume(&Token::Class, "class")?;
        let name = self.consume_identifier("class name")?.lexeme;

        self.match_token(&Token::Constructor);
        let primary_params = if self.check(&Token::LParen) {
            self.parse_parameter_list()?
        } else {
            Vec::new()
        };

        let mut supertypes = Vec::new();
        if self.match_token(&Token::Colon) {
            supertypes.push(self.parse_supertype_entry()?);
            while self.match_token(&Token::Comma) {
                supertypes.push(self.parse_supertype_entry()?);
            }
        }

        let body = if self.check(&Token::LBrace) {
            Some(self.parse_class_body()?)
        } else {
            None
        };

        Ok(KtClass {
            annotations,
            modifiers,
            name,
            primary_params,
            supertypes,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_supertype_entry(&mut self) -> ParseResult<SuperTypeEntry> {
        let start = self.current_location();
        let (mut name, _) = self.parse_dotted_name()?;
        if self.check(&Token::Lt) {
            let args = self.consume_balanced(&Token::Lt, &Token::Gt)?;
            name.push_str(&args);
        }
        let call_args = if self.match_token(&Token::LParen) {
            let mut args = Vec::new();
            if !self.check(&Token::RParen) {
                args.push(self.parse_expression()?);
                while self.match_token(&Token::Comma) {
                    args.push(self.parse_expression()?);
                }
            }
            self.consume(&Token::RParen, ")")?;
            Some(args)
        } else {
            None
        };
        if self.match_token(&Token::By) {
            // interface delegation target, irrelevant to the migration
            self.parse_expression()?;
        }
        Ok(SuperTypeEntry { name, call_args, span: self.span_from(start) })
    }

    fn parse_class_body(&mut self) -> ParseResult<ClassBody> {
        let lbrace_token = self.consume(&Token::LBrace, "{")?;
        let lbrace = lbrace_token.location;
        let start = lbrace;

        let mut members = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.is_at_end() {
                return Err(ParseError::unexpected_end_of_input("}", self.previous_end()));
            }
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            members.push(self.parse_member()?);
        }
        let rbrace_token = self.consume(&Token::RBrace, "}")?;

        Ok(ClassBody {
            members,
            lbrace,
            rbrace: rbrace_token.location,
            span: Span::new(start, rbrace_token.end),
        })
    }

    fn parse_member(&mut self) -> ParseResult<ClassMember> {
        let start = self.current_location();
        let annotations = self.parse_annotations()?;
        let modifiers = self.parse_modifiers();

        match self.peek().map(|t| t.token.clone()) {
            Some(Token::Val) | Some(Token::Var) => {
                Ok(ClassMember::Property(self.parse_property(annotations, modifiers, start)?))
            }
            Some(Token::Fun) => {
                Ok(ClassMember::Function(self.parse_function(annotations, modifiers, start)?))
            }
            Some(Token::Companion) => {
                self.advance();
                self.consume(&Token::Object, "object")?;
                let name = if self.check(&Token::Identifier) {
                    Some(self.advance().lexeme)
                } else {
                    None
                };
                let members = self.parse_object_members()?;
                Ok(ClassMember::Companion(CompanionObject { name, members, span: self.span_from(start) }))
            }
            Some(Token::Object) => {
                self.advance();
                let name = if self.check(&Token::Identifier) {
                    Some(self.advance().lexeme)
                } else {
                    None
                };
                // supertypes of a nested object are irrelevant here
                if self.match_token(&Token::Colon) {
                    self.parse_supertype_entry()?;
                    while self.match_token(&Token::Comma) {
                        self.parse_supertype_entry()?;
                    }
                }
                let members = self.parse_object_members()?;
                Ok(ClassMember::Companion(CompanionObject { name, members, span: self.span_from(start) }))
            }
            Some(Token::Init) => {
                self.advance();
                let body = self.parse_block()?;
                Ok(ClassMember::Initializer(InitializerBlock { body, span: self.span_from(start) }))
            }
            Some(Token::Class) => {
                let nested = self.parse_class(annotations, modifiers, start)?;
                Ok(ClassMember::Nested(Box::new(nested)))
            }
            _ => Err(self.expected_error("class member")),
        }
    }

    fn parse_object_members(&mut self) -> ParseResult<Vec<ClassMember>> {
        self.consume(&Token::LBrace, "{")?;
        let mut members = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.is_at_end() {
                return Err(ParseError::unexpected_end_of_input("}", self.previous_end()));
            }
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            members.push(self.parse_member()?);
        }
        self.consume(&Token::RBrace, "}")?;
        Ok(members)
    }

    fn parse_property(
        &mut self,
        annotations: Vec<String>,
        modifiers: Vec<Modifier>,
        start: Location,
    ) -> ParseResult<KtProperty> {
        let mutable = self.check(&Token::Var);
        self.advance();
        let name = self.consume_identifier("property name")?.lexeme;

        let type_ref = if self.match_token(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let initializer = if self.match_token(&Token::Assign) {
            Some(self.parse_expression()?)
        } else if self.match_token(&Token::By) {
            // delegated property (`by lazy { ... }`); the delegate expression
            // is kept as the initializer so rewrites inside it still apply
            Some(self.parse_expression()?)
        } else {
            None
        };

        let accessors = self.parse_accessors()?;

        Ok(KtProperty {
            annotations,
            modifiers,
            mutable,
            name,
            type_ref,
            initializer,
            accessors,
            span: self.span_from(start),
        })
    }

    fn parse_accessors(&mut self) -> ParseResult<Vec<PropertyAccessor>> {
        let mut accessors = Vec::new();
        loop {
            let checkpoint = self.current;
            let accessor_start = self.current_location();
            let _visibility = self.parse_modifiers();
            let is_getter = if self.check_soft("get") {
                true
            } else if self.check_soft("set") {
                false
            } else {
                self.current = checkpoint;
                break;
            };
            self.advance();

            if !self.check(&Token::LParen) {
                // bare visibility-only accessor: `private set`
                accessors.push(PropertyAccessor {
                    is_getter,
                    body: None,
                    span: self.span_from(accessor_start),
                });
                continue;
            }

            self.consume(&Token::LParen, "(")?;
            if self.check(&Token::Identifier) {
                let _param = self.advance();
                if self.match_token(&Token::Colon) {
                    self.parse_type()?;
                }
            }
            self.consume(&Token::RParen, ")")?;

            let body = if self.match_token(&Token::Assign) {
                Some(AccessorBody::Expression(self.parse_expression()?))
            } else if self.check(&Token::LBrace) {
                Some(AccessorBody::Block(self.parse_block()?))
            } else {
                None
            };

            accessors.push(PropertyAccessor {
                is_getter,
                body,
                span: self.span_from(accessor_start),
            });
        }
        Ok(accessors)
    }

    fn parse_function(
        &mut self,
        annotations: Vec<String>,
        modifiers: Vec<Modifier>,
        start: Location,
    ) -> ParseResult<KtFunction> {
        self.consume(&Token::Fun, "fun")?;
        let name = self.consume_identifier("function name")?.lexeme;
        let params = self.parse_parameter_list()?;

        let return_type = if self.match_token(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = if self.check(&Token::LBrace) {
            Some(FunctionBody::Block(self.parse_block()?))
        } else if self.match_token(&Token::Assign) {
            Some(FunctionBody::Expression(self.parse_expression()?))
        } else {
            None
        };

        Ok(KtFunction {
            annotations,
            modifiers,
            name,
            params,
            return_type,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_parameter_list(&mut self) -> ParseResult<Vec<Parameter>> {
        self.consume(&Token::LParen, "(")?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            params.push(self.parse_parameter()?);
            while self.match_token(&Token::Comma) {
                params.push(self.parse_parameter()?);
            }
        }
        self.consume(&Token::RParen, ")")?;
        Ok(params)
    }

    fn parse_parameter(&mut self) -> ParseResult<Parameter> {
        let start = self.current_location();
        self.parse_annotations()?;
        self.parse_modifiers();
        if self.check_soft("vararg") && self.check_at(1, &Token::Identifier) {
            self.advance();
        }
        // primary-constructor parameters may declare properties
        if self.check(&Token::Val) || self.check(&Token::Var) {
            self.advance();
        }
        let name = self.consume_identifier("parameter name")?.lexeme;
        self.consume(&Token::Colon, ":")?;
        let type_ref = self.parse_type()?;
        let default = if self.match_token(&Token::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Parameter { name, type_ref, default, span: self.span_from(start) })
    }

    fn parse_type(&mut self) -> ParseResult<TypeRef> {
        let start = self.current_location();
        let mut text = String::new();

        if self.check(&Token::LParen) {
            let inner = self.consume_balanced(&Token::LParen, &Token::RParen)?;
            text.push_str(&inner);
            if self.match_token(&Token::Arrow) {
                let ret = self.parse_type()?;
                text.push_str(" -> ");
                text.push_str(&ret.text);
            }
        } else {
            let (name, _) = self.parse_dotted_name()?;
            text.push_str(&name);
            if self.check(&Token::Lt) {
                let args = self.consume_balanced(&Token::Lt, &Token::Gt)?;
                text.push_str(&args);
            }
        }

        let mut nullable = false;
        while self.match_token(&Token::Question) {
            nullable = true;
            text.push('?');
        }

        Ok(TypeRef { text, nullable, span: self.span_from(start) })
    }

    /// Consume a balanced token pair and return the covered text,
    /// reconstructed from lexemes
    fn consume_balanced(&mut self, open: &Token, close: &Token) -> ParseResult<String> {
        let open_token = self.consume(open, "opening delimiter")?;
        let mut text = open_token.lexeme;
        let mut depth = 1usize;
        while depth > 0 {
            if self.is_at_end() {
                return Err(ParseError::unexpected_end_of_input("closing delimiter", self.previous_end()));
            }
            let token = self.advance();
            if token.is(open) {
                depth += 1;
            } else if token.is(close) {
                depth -= 1;
            }
            if token.is(&Token::Comma) {
                text.push_str(", ");
            } else {
                text.push_str(&token.lexeme);
            }
        }
        Ok(text)
    }

    // Statements

    fn parse_block(&mut self) -> ParseResult<Block> {
        let lbrace_token = self.consume(&Token::LBrace, "{")?;
        let lbrace = lbrace_token.location;

        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.is_at_end() {
                return Err(ParseError::unexpected_end_of_input("}", self.previous_end()));
            }
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        let rbrace_token = self.consume(&Token::RBrace, "}")?;

        Ok(Block {
            statements,
            lbrace,
            rbrace: rbrace_token.location,
            span: Span::new(lbrace, rbrace_token.end),
        })
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.current_location();
        match self.peek().map(|t| t.token.clone()) {
            Some(Token::Val) | Some(Token::Var) => {
                let mutable = self.check(&Token::Var);
                self.advance();
                let name = self.consume_identifier("local name")?.lexeme;
                let type_ref = if self.match_token(&Token::Colon) {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                let initializer = if self.match_token(&Token::Assign) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                Ok(Stmt::Local(LocalDecl {
                    mutable,
                    name,
                    type_ref,
                    initializer,
                    span: self.span_from(start),
                }))
            }
            Some(Token::Return) => {
                self.advance();
                let value = if self.peek().map(|t| t.token.starts_expression()).unwrap_or(false) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                Ok(Stmt::Return(ReturnStmt { value, span: self.span_from(start) }))
            }
            Some(Token::While) => {
                self.advance();
                self.consume(&Token::LParen, "(")?;
                let condition = self.parse_expression()?;
                self.consume(&Token::RParen, ")")?;
                let body = self.parse_block()?;
                Ok(Stmt::While(WhileStmt { condition, body, span: self.span_from(start) }))
            }
            Some(Token::For) => {
                self.advance();
                self.consume(&Token::LParen, "(")?;
                let binding = self.consume_identifier("loop variable")?.lexeme;
                if self.match_token(&Token::Colon) {
                    self.parse_type()?;
                }
                self.consume(&Token::In, "in")?;
                let iterable = self.parse_expression()?;
                self.consume(&Token::RParen, ")")?;
                let body = self.parse_block()?;
                Ok(Stmt::For(ForStmt { binding, iterable, body, span: self.span_from(start) }))
            }
            _ => Ok(Stmt::Expression(self.parse_expression()?)),
        }
    }

    // Expressions

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        let left = self.parse_binary()?;

        let op = match self.peek().map(|t| &t.token) {
            Some(Token::Assign) => "=",
            Some(Token::PlusAssign) => "+=",
            Some(Token::MinusAssign) => "-=",
            Some(Token::StarAssign) => "*=",
            Some(Token::SlashAssign) => "/=",
            Some(Token::PercentAssign) => "%=",
            _ => return Ok(left),
        }
        .to_string();
        self.advance();
        let value = self.parse_assignment()?;

        Ok(Expr::Assignment(AssignmentExpr {
            target: Box::new(left),
            op,
            value: Box::new(value),
            span: self.span_from(start),
        }))
    }

    fn parse_binary(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        let mut left = self.parse_prefix()?;

        loop {
            let op = match self.peek().map(|t| &t.token) {
                Some(Token::AndAnd) => "&&",
                Some(Token::PipePipe) => "||",
                Some(Token::EqEq) => "==",
                Some(Token::NotEq) => "!=",
                Some(Token::Le) => "<=",
                Some(Token::Ge) => ">=",
                Some(Token::Lt) => "<",
                Some(Token::Gt) => ">",
                Some(Token::Plus) => "+",
                Some(Token::Minus) => "-",
                Some(Token::Star) => "*",
                Some(Token::Slash) => "/",
                Some(Token::Percent) => "%",
                Some(Token::Elvis) => "?:",
                Some(Token::DotDot) => "..",
                Some(Token::Is) => "is",
                Some(Token::As) => "as",
                Some(Token::In) => "in",
                _ => break,
            }
            .to_string();
            self.advance();

            let right = if op == "is" || op == "as" {
                // the right operand is a type; `as?` is a safe cast
                if op == "as" {
                    self.match_token(&Token::Question);
                }
                let type_start = self.current_location();
                let type_ref = self.parse_type()?;
                Expr::NameRef(NameRefExpr { name: type_ref.text, span: Span::new(type_start, self.previous_end()) })
            } else {
                self.parse_prefix()?
            };

            left = Expr::Binary(BinaryExpr {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span: self.span_from(start),
            });
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        let op = match self.peek().map(|t| &t.token) {
            Some(Token::Bang) => Some("!"),
            Some(Token::Minus) => Some("-"),
            Some(Token::Plus) => Some("+"),
            Some(Token::Inc) => Some("++"),
            Some(Token::Dec) => Some("--"),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_prefix()?;
            return Ok(Expr::Unary(UnaryExpr {
                op: op.to_string(),
                operand: Box::new(operand),
                span: self.span_from(start),
            }));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        let mut expr = self.parse_primary()?;

        loop {
            if self.match_token(&Token::BangBang) {
                expr = Expr::NotNull(NotNullExpr {
                    operand: Box::new(expr),
                    span: self.span_from(start),
                });
            } else if self.check(&Token::Dot) || self.check(&Token::SafeDot) {
                let safe = self.check(&Token::SafeDot);
                let op_token = self.advance();
                let op_span = Span::new(op_token.location, op_token.end);
                let selector_token = self.consume_identifier("member name")?;
                let mut selector = Expr::NameRef(NameRefExpr {
                    name: selector_token.lexeme.clone(),
                    span: Span::new(selector_token.location, selector_token.end),
                });
                if self.check(&Token::LParen) || self.check(&Token::LBrace) {
                    selector = self.parse_call_suffix(selector, selector_token.location)?;
                }
                expr = Expr::Qualified(QualifiedExpr {
                    receiver: Box::new(expr),
                    safe,
                    op_span,
                    selector: Box::new(selector),
                    span: self.span_from(start),
                });
            } else if self.check(&Token::LParen) {
                expr = self.parse_call_suffix(expr, start)?;
            } else if self.check(&Token::LBrace) && trailing_lambda_target(&expr) {
                expr = self.parse_call_suffix(expr, start)?;
            } else if self.match_token(&Token::LBracket) {
                let index = self.parse_expression()?;
                self.consume(&Token::RBracket, "]")?;
                expr = Expr::Index(IndexExpr {
                    receiver: Box::new(expr),
                    index: Box::new(index),
                    span: self.span_from(start),
                });
            } else if self.check(&Token::Inc) || self.check(&Token::Dec) {
                let op = self.advance().lexeme;
                expr = Expr::Unary(UnaryExpr {
                    op,
                    operand: Box::new(expr),
                    span: self.span_from(start),
                });
            } else if self.match_token(&Token::ColonColon) {
                // callable reference `this::method` or `View::visibility`
                let member = self.consume_identifier("member reference")?;
                let selector = Expr::NameRef(NameRefExpr {
                    name: member.lexeme,
                    span: Span::new(member.location, member.end),
                });
                expr = Expr::Qualified(QualifiedExpr {
                    receiver: Box::new(expr),
                    safe: false,
                    op_span: Span::new(member.location, member.location),
                    selector: Box::new(selector),
                    span: self.span_from(start),
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse `(args)`, a trailing lambda, or both, building a call
    fn parse_call_suffix(&mut self, callee: Expr, start: Location) -> ParseResult<Expr> {
        let mut args = Vec::new();
        if self.match_token(&Token::LParen) {
            if !self.check(&Token::RParen) {
                args.push(self.parse_expression()?);
                while self.match_token(&Token::Comma) {
                    args.push(self.parse_expression()?);
                }
            }
            self.consume(&Token::RParen, ")")?;
        }

        let trailing_lambda = if self.check(&Token::LBrace) {
            Some(self.parse_lambda()?)
        } else {
            None
        };

        Ok(Expr::Call(CallExpr {
            callee: Box::new(callee),
            args,
            trailing_lambda,
            span: self.span_from(start),
        }))
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = match self.peek() {
            Some(t) => t.clone(),
            None => return Err(ParseError::unexpected_end_of_input("expression", self.previous_end())),
        };
        let span = Span::new(token.location, token.end);

        match token.token {
            Token::Identifier => {
                self.advance();
                Ok(Expr::NameRef(NameRefExpr { name: token.lexeme, span }))
            }
            Token::This => {
                self.advance();
                // label such as `this@MainFragment`
                if self.check(&Token::At) && self.check_at(1, &Token::Identifier) {
                    self.advance();
                    let label = self.advance();
                    return Ok(Expr::This(Span::new(token.location, label.end)));
                }
                Ok(Expr::This(span))
            }
            Token::Super => {
                self.advance();
                Ok(Expr::Super(span))
            }
            Token::True | Token::False => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr { kind: LiteralKind::Bool, text: token.lexeme, span }))
            }
            Token::Null => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr { kind: LiteralKind::Null, text: token.lexeme, span }))
            }
            Token::StringLiteral | Token::TripleStringLiteral => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr { kind: LiteralKind::String, text: token.lexeme, span }))
            }
            Token::CharLiteral => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr { kind: LiteralKind::Char, text: token.lexeme, span }))
            }
            Token::DecimalInteger | Token::HexInteger => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr { kind: LiteralKind::Int, text: token.lexeme, span }))
            }
            Token::FloatLiteral => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr { kind: LiteralKind::Float, text: token.lexeme, span }))
            }
            Token::LParen => {
                let start = token.location;
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(&Token::RParen, ")")?;
                Ok(Expr::Paren(ParenExpr { inner: Box::new(inner), span: self.span_from(start) }))
            }
            Token::If => self.parse_if_expr(),
            Token::When => self.parse_when_expr(),
            Token::LBrace => Ok(Expr::Lambda(self.parse_lambda()?)),
            _ => Err(self.expected_error("expression")),
        }
    }

    fn parse_if_expr(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        self.consume(&Token::If, "if")?;
        self.consume(&Token::LParen, "(")?;
        let condition = self.parse_expression()?;
        self.consume(&Token::RParen, ")")?;
        let then_branch = self.parse_control_body()?;
        let else_branch = if self.match_token(&Token::Else) {
            Some(Box::new(self.parse_control_body()?))
        } else {
            None
        };
        Ok(Expr::If(IfExpr {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
            span: self.span_from(start),
        }))
    }

    fn parse_when_expr(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        self.consume(&Token::When, "when")?;
        let subject = if self.match_token(&Token::LParen) {
            let subject = self.parse_expression()?;
            self.consume(&Token::RParen, ")")?;
            Some(Box::new(subject))
        } else {
            None
        };

        self.consume(&Token::LBrace, "{")?;
        let mut entries = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.is_at_end() {
                return Err(ParseError::unexpected_end_of_input("}", self.previous_end()));
            }
            let entry_start = self.current_location();
            let conditions = if self.match_token(&Token::Else) {
                Vec::new()
            } else {
                let mut conditions = vec![self.parse_when_condition()?];
                while self.match_token(&Token::Comma) {
                    conditions.push(self.parse_when_condition()?);
                }
                conditions
            };
            self.consume(&Token::Arrow, "->")?;
            let body = self.parse_control_body()?;
            entries.push(WhenEntry { conditions, body, span: self.span_from(entry_start) });
        }
        self.consume(&Token::RBrace, "}")?;

        Ok(Expr::When(WhenExpr { subject, entries, span: self.span_from(start) }))
    }

    fn parse_when_condition(&mut self) -> ParseResult<Expr> {
        let start = self.current_location();
        if self.check(&Token::Is) || self.check(&Token::In) {
            let op = self.advance().lexeme;
            let operand = if op == "is" {
                let type_ref = self.parse_type()?;
                Expr::NameRef(NameRefExpr { name: type_ref.text, span: self.span_from(start) })
            } else {
                self.parse_binary()?
            };
            return Ok(Expr::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
                span: self.span_from(start),
            }));
        }
        self.parse_binary()
    }

    fn parse_control_body(&mut self) -> ParseResult<Expr> {
        if self.check(&Token::LBrace) {
            Ok(Expr::Block(self.parse_block()?))
        } else {
            self.parse_expression()
        }
    }

    fn parse_lambda(&mut self) -> ParseResult<LambdaExpr> {
        let lbrace_token = self.consume(&Token::LBrace, "{")?;
        let start = lbrace_token.location;

        let params = self.lambda_parameters();

        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.is_at_end() {
                return Err(ParseError::unexpected_end_of_input("}", self.previous_end()));
            }
            if self.match_token(&Token::Semicolon) {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        let rbrace_token = self.consume(&Token::RBrace, "}")?;

        Ok(LambdaExpr {
            params,
            statements,
            span: Span::new(start, rbrace_token.end),
        })
    }

    /// Consume an explicit lambda parameter list when one is present.
    ///
    /// Scans ahead for a `->` within the opening tokens; anything else means
    /// the lambda uses the implicit `it` parameter.
    fn lambda_parameters(&mut self) -> Vec<String> {
        const LOOKAHEAD_LIMIT: usize = 16;

        let mut arrow_at = None;
        for offset in 0..LOOKAHEAD_LIMIT {
            match self.peek_at(offset).map(|t| &t.token) {
                Some(Token::Arrow) => {
                    arrow_at = Some(offset);
                    break;
                }
                Some(Token::Identifier) | Some(Token::Comma) | Some(Token::Colon)
                | Some(Token::Dot) | Some(Token::Lt) | Some(Token::Gt) | Some(Token::Question) => {}
                _ => break,
            }
        }

        let arrow_at = match arrow_at {
            Some(offset) => offset,
            None => return Vec::new(),
        };

        let mut params = Vec::new();
        let mut expect_name = true;
        for _ in 0..arrow_at {
            let token = self.advance();
            match token.token {
                Token::Identifier if expect_name => {
                    params.push(token.lexeme);
                    expect_name = false;
                }
                Token::Comma => expect_name = true,
                // a `: Type` annotation; its tokens are skipped
                _ => {}
            }
        }
        // the arrow itself
        self.advance();
        params
    }
}

/// Whether a `{` directly after this expression should be read as a
/// trailing lambda argument
fn trailing_lambda_target(expr: &Expr) -> bool {
    matches!(expr, Expr::NameRef(_) | Expr::Qualified(_) | Expr::Call(_))
}

/// Parse Kotlin source into a [`KtFile`]
pub fn parse(source: &str) -> Result<KtFile> {
    Parser::new(source)?.parse()
}
