use crate::{
    ast::{
        declarations::{ClassDec, Dec, FieldDec, FunDec, MethodDec, ParamDec, VarDec},
        expressions::Expr,
        types::TypeNode,
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{
    expr::parse_expr,
    lookups::BindingPower,
    parser::Parser,
    types::{parse_basic_type, parse_type},
};

pub fn parse_dec(parser: &mut Parser) -> Result<Dec, Error> {
    let dec_fn = match parser.get_dec_lookup().get(&parser.current_token_kind()) {
        Some(dec_fn) => *dec_fn,
        None => return Err(parser.unexpected()),
    };

    dec_fn(parser)
}

/// `var ID : hotype = exp ;`
pub fn parse_var_dec(parser: &mut Parser) -> Result<Dec, Error> {
    let line = parser.advance().line();

    let id = parser
        .expect_detailed(TokenKind::Identifier, "expected identifier during variable declaration")?
        .value;
    parser.expect(TokenKind::Colon)?;
    let ty = parse_type(parser)?;
    parser.expect(TokenKind::Assignment)?;
    let exp = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Dec::Var(VarDec { id, ty, exp, line }))
}

/// `ID : hotype (, ID : hotype)*` between parentheses.
fn parse_params(parser: &mut Parser) -> Result<Vec<ParamDec>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut params = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            let token = parser.expect_detailed(TokenKind::Identifier, "expected parameter name")?;
            parser.expect(TokenKind::Colon)?;
            let ty = parse_type(parser)?;
            params.push(ParamDec {
                line: token.line(),
                id: token.value,
                ty,
            });

            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(params)
}

/// The part shared by functions and methods:
///
/// ```text
/// 'fun' ID ':' type '(' params? ')' ('let' dec+ 'in')? exp ';'
/// ```
struct Signature {
    id: String,
    ret: TypeNode,
    params: Vec<ParamDec>,
    decs: Vec<Dec>,
    body: Expr,
    line: u32,
}

fn parse_signature(parser: &mut Parser) -> Result<Signature, Error> {
    let line = parser.expect(TokenKind::Fun)?.line();

    let id = parser
        .expect_detailed(TokenKind::Identifier, "expected identifier during function declaration")?
        .value;
    parser.expect(TokenKind::Colon)?;
    let ret = parse_basic_type(parser)?;
    let params = parse_params(parser)?;

    let mut decs = vec![];
    if parser.eat(TokenKind::Let) {
        loop {
            decs.push(parse_dec(parser)?);
            if parser.current_token_kind() == TokenKind::In {
                break;
            }
        }
        parser.expect(TokenKind::In)?;
    }

    let body = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Signature {
        id,
        ret,
        params,
        decs,
        body,
        line,
    })
}

pub fn parse_fun_dec(parser: &mut Parser) -> Result<Dec, Error> {
    let signature = parse_signature(parser)?;

    Ok(Dec::Fun(FunDec {
        id: signature.id,
        ret: signature.ret,
        params: signature.params,
        decs: signature.decs,
        body: signature.body,
        line: signature.line,
    }))
}

fn parse_method_dec(parser: &mut Parser) -> Result<MethodDec, Error> {
    let signature = parse_signature(parser)?;

    Ok(MethodDec {
        id: signature.id,
        ret: signature.ret,
        params: signature.params,
        decs: signature.decs,
        body: signature.body,
        line: signature.line,
        ty: None,
        offset: None,
    })
}

/// ```text
/// 'class' ID ('extends' ID)? '(' (ID ':' type (',' ID ':' type)*)? ')' '{' methdec* '}'
/// ```
pub fn parse_class_dec(parser: &mut Parser) -> Result<ClassDec, Error> {
    let line = parser.expect(TokenKind::Class)?.line();

    let id = parser
        .expect_detailed(TokenKind::Identifier, "expected class name")?
        .value;
    let super_id = if parser.eat(TokenKind::Extends) {
        Some(
            parser
                .expect_detailed(TokenKind::Identifier, "expected superclass name")?
                .value,
        )
    } else {
        None
    };

    parser.expect(TokenKind::OpenParen)?;
    let mut fields = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            let token = parser.expect_detailed(TokenKind::Identifier, "expected field name")?;
            parser.expect(TokenKind::Colon)?;
            let ty = parse_basic_type(parser)?;
            fields.push(FieldDec {
                line: token.line(),
                id: token.value,
                ty,
                offset: None,
            });

            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    parser.expect(TokenKind::OpenCurly)?;
    let mut methods = vec![];
    while parser.current_token_kind() == TokenKind::Fun {
        methods.push(parse_method_dec(parser)?);
    }
    parser.expect(TokenKind::CloseCurly)?;

    Ok(ClassDec {
        id,
        super_id,
        fields,
        methods,
        line,
        entry: None,
        super_entry: None,
    })
}
