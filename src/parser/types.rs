//! Type parsing implementation.
//!
//! This module handles parsing of type annotations:
//!
//! ```text
//! hotype : type | '(' (hotype (',' hotype)*)? ')' '->' type
//! type   : 'int' | 'bool' | ID
//! ```
//!
//! Like expressions, types dispatch on their first token through a lookup
//! table.

use std::collections::HashMap;

use crate::{
    ast::types::TypeNode,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Type alias for type handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeNode, Error>;

/// Type alias for type lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Int, parse_basic_type);
    parser.type_nud(TokenKind::Bool, parse_basic_type);
    parser.type_nud(TokenKind::Identifier, parse_basic_type);
    parser.type_nud(TokenKind::OpenParen, parse_arrow_type);
}

/// `int`, `bool` or a class name.
pub fn parse_basic_type(parser: &mut Parser) -> Result<TypeNode, Error> {
    match parser.current_token_kind() {
        TokenKind::Int => {
            parser.advance();
            Ok(TypeNode::Int)
        }
        TokenKind::Bool => {
            parser.advance();
            Ok(TypeNode::Bool)
        }
        TokenKind::Identifier => Ok(TypeNode::reference(&parser.advance().value.clone())),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected int, bool or a class name"),
            },
            parser.get_position(),
        )),
    }
}

pub fn parse_arrow_type(parser: &mut Parser) -> Result<TypeNode, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut params = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            params.push(parse_type(parser)?);
            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    parser.expect_detailed(TokenKind::Arrow, "expected -> in function type")?;
    let ret = parse_basic_type(parser)?;

    Ok(TypeNode::arrow(params, ret))
}

/// Any type annotation, function types included.
pub fn parse_type(parser: &mut Parser) -> Result<TypeNode, Error> {
    let token_kind = parser.current_token_kind();
    let nud_fn = match parser.get_type_nud_lookup().get(&token_kind) {
        Some(nud_fn) => *nud_fn,
        None => return Err(parser.unexpected()),
    };

    nud_fn(parser)
}
