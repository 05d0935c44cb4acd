// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Character-level recursive-descent parser
//!
//! The grammar is dispatched one keyword at a time: comment markers are
//! tried first, then a single keyword is read and switched on `as`, `const`,
//! `for` and `link`, with everything else treated as a shape or module
//! invocation. Names are never validated here; that happens at evaluation
//! time against the builtin vocabulary and the module tables.

pub mod source;
pub mod syntax;

pub use source::{Offset, Source};
pub use syntax::{
    CommentSyntax, ConstSyntax, ForSyntax, LinkSyntax, ModuleSyntax, ShapeSyntax, Syntax,
};

use crate::error::{Fault, Result};
use std::sync::Arc;
use url::Url;

fn is_keyword_char(ch: char) -> bool {
    ch == '_' || ch == '.' || ch == '-' || ch.is_ascii_alphanumeric()
}

pub struct Parser {
    source: Source,
}

impl Parser {
    pub fn new(source: Source) -> Self {
        Self { source }
    }

    fn offset(&self) -> Offset {
        self.source.offset()
    }

    fn skip_space(&mut self) {
        while self.source.peek_char().is_some_and(char::is_whitespace) {
            self.source.consume_char();
        }
    }

    /// Parse the whole source into an ordered program.
    pub fn parse(&mut self) -> Result<Vec<Syntax>> {
        let mut program = Vec::new();
        self.skip_space();
        while !self.is_eof() {
            program.push(self.parse_syntax()?);
        }
        Ok(program)
    }

    fn is_eof(&mut self) -> bool {
        self.skip_space();
        self.source.peek_char().is_none()
    }

    fn parse_syntax(&mut self) -> Result<Syntax> {
        self.skip_space();
        if self.source.starts_with("//") || self.source.starts_with("/*") {
            return Ok(Syntax::Comment(self.parse_comment()?));
        }

        // The node's offset is captured before its first keyword.
        let offset = self.offset();
        let keyword = self.parse_keyword()?;
        match keyword.as_str() {
            "as" => Ok(Syntax::Module(Arc::new(self.parse_module(offset)?))),
            "const" => Ok(Syntax::Const(self.parse_const(offset)?)),
            "for" => Ok(Syntax::For(self.parse_for(offset)?)),
            "link" => Ok(Syntax::Link(self.parse_link(offset)?)),
            _ => Ok(Syntax::Shape(self.parse_shape(offset, keyword)?)),
        }
    }

    fn parse_module(&mut self, offset: Offset) -> Result<ModuleSyntax> {
        let name = self.parse_keyword()?;
        let params = self.parse_param_list()?;
        let body = self.parse_block()?;
        Ok(ModuleSyntax {
            offset,
            name,
            params,
            body,
        })
    }

    fn parse_const(&mut self, offset: Offset) -> Result<ConstSyntax> {
        let name = self.parse_keyword()?;
        self.parse_symbol("=")?;
        let value = self.parse_keyword()?;
        self.parse_symbol(";")?;
        Ok(ConstSyntax {
            offset,
            name,
            value,
        })
    }

    fn parse_shape(&mut self, offset: Offset, name: String) -> Result<ShapeSyntax> {
        let params = self.parse_param_list()?;
        let body = self.parse_block()?;
        Ok(ShapeSyntax {
            offset,
            name,
            params,
            body,
        })
    }

    fn parse_for(&mut self, offset: Offset) -> Result<ForSyntax> {
        let mut params = Vec::with_capacity(4);
        self.parse_symbol("(")?;
        for _ in 0..4 {
            params.push(self.parse_keyword()?);
            if self.starts_with_symbol(")") {
                break;
            }
            self.parse_symbol(",")?;
        }
        self.parse_symbol(")")?;
        if params.len() != 4 {
            return Err(Fault::new(
                offset,
                format!("expected 4 loop parameters, found {}", params.len()),
            ));
        }
        let body = self.parse_block()?;
        let mut params = params.into_iter();
        Ok(ForSyntax {
            offset,
            constant: params.next().unwrap_or_default(),
            start: params.next().unwrap_or_default(),
            end: params.next().unwrap_or_default(),
            delta: params.next().unwrap_or_default(),
            body,
        })
    }

    fn parse_link(&mut self, offset: Offset) -> Result<LinkSyntax> {
        let text = self.parse_string()?;
        let url = Url::parse(&text)
            .map_err(|_| Fault::new(offset.clone(), format!("invalid url \"{text}\"")))?;
        self.parse_symbol(";")?;
        Ok(LinkSyntax { offset, url })
    }

    fn parse_comment(&mut self) -> Result<CommentSyntax> {
        let mut text = String::new();
        if self.source.starts_with("/*") {
            self.parse_symbol("/*")?;
            while !self.source.starts_with("*/") {
                match self.source.consume_char() {
                    Some(ch) => text.push(ch),
                    None => break,
                }
            }
            self.parse_symbol("*/")?;
        } else {
            self.parse_symbol("//")?;
            while let Some(ch) = self.source.consume_char() {
                if ch == '\n' {
                    break;
                }
                text.push(ch);
            }
        }
        Ok(CommentSyntax {
            text: text.trim().to_string(),
        })
    }

    /// `( keyword ("," keyword)* )`, or nothing at all when the next symbol
    /// is not an opening parenthesis.
    fn parse_param_list(&mut self) -> Result<Vec<String>> {
        let mut params = Vec::new();
        if self.starts_with_symbol("(") {
            self.parse_symbol("(")?;
            while !self.starts_with_symbol(")") {
                params.push(self.parse_keyword()?);
                if self.starts_with_symbol(")") {
                    break;
                }
                self.parse_symbol(",")?;
            }
            self.parse_symbol(")")?;
        }
        Ok(params)
    }

    /// `"{" Syntax* "}"`, or `";"` for an empty body.
    fn parse_block(&mut self) -> Result<Vec<Syntax>> {
        let mut body = Vec::new();
        if self.starts_with_symbol("{") {
            self.parse_symbol("{")?;
            while !self.starts_with_symbol("}") {
                body.push(self.parse_syntax()?);
            }
            self.parse_symbol("}")?;
        } else {
            self.parse_symbol(";")?;
        }
        Ok(body)
    }

    /// Greedy, unbounded keyword: a maximal non-empty run of ASCII letters,
    /// digits, `_`, `.` and `-`.
    fn parse_keyword(&mut self) -> Result<String> {
        self.skip_space();
        let mut keyword = String::new();
        while let Some(ch) = self.source.peek_char() {
            if !is_keyword_char(ch) {
                break;
            }
            keyword.push(ch);
            self.source.consume_char();
        }
        if keyword.is_empty() {
            return Err(Fault::new(self.offset(), "expected keyword"));
        }
        Ok(keyword)
    }

    fn starts_with_symbol(&mut self, symbol: &str) -> bool {
        self.skip_space();
        self.source.starts_with(symbol)
    }

    fn parse_symbol(&mut self, symbol: &str) -> Result<()> {
        self.skip_space();
        if self.source.starts_with(symbol) {
            self.source.consume(symbol.chars().count());
            Ok(())
        } else {
            Err(Fault::new(
                self.offset(),
                format!("expected symbol \"{symbol}\""),
            ))
        }
    }

    /// `"`-delimited literal without escape sequences: the closing quote is
    /// the first literal `"` encountered.
    fn parse_string(&mut self) -> Result<String> {
        let mut text = String::new();
        self.parse_symbol("\"")?;
        loop {
            match self.source.peek_char() {
                Some('"') => break,
                Some(_) => {
                    if let Some(ch) = self.source.consume_char() {
                        text.push(ch);
                    }
                }
                None => return Err(Fault::new(self.offset(), "expected symbol \"\\\"\"")),
            }
        }
        self.source.consume_char();
        Ok(text)
    }
}

/// Parse `text` into a program.
pub fn parse(source_name: &str, text: &str) -> Result<Vec<Syntax>> {
    Parser::new(Source::new(source_name, text)).parse()
}

/// Re-print `text` in canonical form: parse fully, then emit every node.
///
/// A pure function of the syntax tree; idempotent when applied to its own
/// output.
pub fn format(source_name: &str, text: &str) -> Result<String> {
    let program = parse(source_name, text)?;
    Ok(program.iter().map(Syntax::format).collect())
}
