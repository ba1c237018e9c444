use crate::ast::Location;
use logos::Logos;

/// Token types for the Kotlin subset the migration understands
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token {
    // Keywords
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("object")]
    Object,
    #[token("companion")]
    Companion,
    #[token("constructor")]
    Constructor,
    #[token("init")]
    Init,
    #[token("fun")]
    Fun,
    #[token("val")]
    Val,
    #[token("var")]
    Var,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("when")]
    When,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("is")]
    Is,
    #[token("as")]
    As,
    #[token("by")]
    By,
    #[token("return")]
    Return,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Modifiers
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("internal")]
    Internal,
    #[token("open")]
    Open,
    #[token("abstract")]
    Abstract,
    #[token("final")]
    Final,
    #[token("override")]
    Override,
    #[token("lateinit")]
    Lateinit,
    #[token("inner")]
    Inner,
    #[token("data")]
    Data,

    // Operators
    #[token("&&")]
    AndAnd,
    #[token("||")]
    PipePipe,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("%=")]
    PercentAssign,
    #[token("=")]
    Assign,
    #[token("++")]
    Inc,
    #[token("--")]
    Dec,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!!")]
    BangBang,
    #[token("!")]
    Bang,
    #[token("?.")]
    SafeDot,
    #[token("?:")]
    Elvis,
    #[token("?")]
    Question,
    #[token("->")]
    Arrow,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("@")]
    At,

    // Literals
    #[regex(r#""""[^"]*""""#)]
    TripleStringLiteral,
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral,
    #[regex(r"'([^'\\]|\\.)'")]
    CharLiteral,
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    HexInteger,
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*[fF]?")]
    FloatLiteral,
    #[regex(r"[0-9][0-9_]*L?")]
    DecimalInteger,

    // Identifiers
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    // Trivia, filtered out by tokenize()
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,
    #[regex(r"[ \t\r\n\u{000C}]+")]
    Whitespace,

    // Unicode BOM, treated as ignorable whitespace
    #[token("\u{FEFF}")]
    Bom,
}

impl Token {
    /// Check if this token is a declaration modifier
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Token::Public
                | Token::Private
                | Token::Protected
                | Token::Internal
                | Token::Open
                | Token::Abstract
                | Token::Final
                | Token::Override
                | Token::Lateinit
                | Token::Inner
                | Token::Data
        )
    }

    /// Check if this token is a literal
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::TripleStringLiteral
                | Token::StringLiteral
                | Token::CharLiteral
                | Token::HexInteger
                | Token::FloatLiteral
                | Token::DecimalInteger
                | Token::True
                | Token::False
                | Token::Null
        )
    }

    /// Check if this token can begin an expression
    pub fn starts_expression(&self) -> bool {
        self.is_literal()
            || matches!(
                self,
                Token::Identifier
                    | Token::This
                    | Token::Super
                    | Token::If
                    | Token::When
                    | Token::LParen
                    | Token::LBrace
                    | Token::Bang
                    | Token::Minus
                    | Token::Plus
                    | Token::Inc
                    | Token::Dec
            )
    }
}

/// Lexical token with location information
#[derive(Debug, Clone)]
pub struct LexicalToken {
    pub token: Token,
    pub lexeme: String,
    /// Location of the first character
    pub location: Location,
    /// Location one past the last character
    pub end: Location,
}

impl LexicalToken {
    pub fn new(token: Token, lexeme: String, location: Location, end: Location) -> Self {
        Self { token, lexeme, location, end }
    }

    /// Check if this token matches the given token type
    pub fn is(&self, token_type: &Token) -> bool {
        std::mem::discriminant(&self.token) == std::mem::discriminant(token_type)
    }
}

/// Lexer wrapping the generated token stream with position tracking
pub struct Lexer<'a> {
    lexer: logos::Lexer<'a, Token>,
    position: Location,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Token::lexer(source),
            position: Location::start(),
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Option<Result<LexicalToken, String>> {
        let token = self.lexer.next()?;

        match token {
            Ok(token) => {
                let lexeme = self.lexer.slice().to_string();
                let location = self.position;
                self.update_position(&lexeme);
                Some(Ok(LexicalToken::new(token, lexeme, location, self.position)))
            }
            Err(_) => {
                let slice = self.lexer.slice().to_string();
                let message = format!(
                    "unrecognized input {:?} at {}:{}",
                    slice, self.position.line, self.position.column
                );
                self.update_position(&slice);
                Some(Err(message))
            }
        }
    }

    fn update_position(&mut self, lexeme: &str) {
        for ch in lexeme.chars() {
            self.position.advance(ch);
        }
    }

    /// Get all tokens from the source, skipping trivia
    pub fn tokenize(mut self) -> Result<Vec<LexicalToken>, String> {
        let mut tokens = Vec::new();

        while let Some(result) = self.next_token() {
            match result {
                Ok(token) => {
                    if !matches!(
                        token.token,
                        Token::Whitespace | Token::Bom | Token::LineComment | Token::BlockComment
                    ) {
                        tokens.push(token);
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Ok(tokens)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<LexicalToken, String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_class_header() {
        let source = "class MainFragment : Fragment()";
        let tokens = Lexer::new(source).tokenize().expect("Failed to tokenize");

        assert_eq!(tokens.len(), 6);
        assert!(tokens[0].is(&Token::Class));
        assert!(tokens[1].is(&Token::Identifier));
        assert!(tokens[2].is(&Token::Colon));
        assert!(tokens[3].is(&Token::Identifier));
        assert!(tokens[4].is(&Token::LParen));
        assert!(tokens[5].is(&Token::RParen));
    }

    #[test]
    fn lexes_safe_call_operators() {
        let source = "binding?.textView!!.text ?: fallback";
        let tokens = Lexer::new(source).tokenize().expect("Failed to tokenize");

        let kinds: Vec<&Token> = tokens.iter().map(|t| &t.token).collect();
        assert!(kinds.contains(&&Token::SafeDot));
        assert!(kinds.contains(&&Token::BangBang));
        assert!(kinds.contains(&&Token::Elvis));
    }

    #[test]
    fn keyword_prefix_stays_identifier() {
        // `inflate` starts with `in`, `valid` with `val`
        let tokens = Lexer::new("inflate valid").tokenize().expect("Failed to tokenize");
        assert_eq!(tokens.len(), 2);
        assert!(tokens[0].is(&Token::Identifier));
        assert!(tokens[1].is(&Token::Identifier));
    }

    #[test]
    fn skips_comments_and_whitespace() {
        let source = "// line\n/* block */ val";
        let tokens = Lexer::new(source).tokenize().expect("Failed to tokenize");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is(&Token::Val));
    }

    #[test]
    fn tracks_locations() {
        let source = "val x\nval y";
        let tokens = Lexer::new(source).tokenize().expect("Failed to tokenize");
        assert_eq!(tokens[0].location.line, 1);
        assert_eq!(tokens[2].location.line, 2);
        assert_eq!(tokens[2].location.column, 1);
        assert_eq!(tokens[3].end.offset, source.len());
    }

    #[test]
    fn lexes_string_with_template() {
        let source = r#""count: $total""#;
        let tokens = Lexer::new(source).tokenize().expect("Failed to tokenize");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is(&Token::StringLiteral));
    }
}
