use crate::{
    ast::expressions::{
        BinaryOp, BoolExpr, Expr, IfExpr, IntExpr, NotExpr, NullExpr, PrintExpr,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud_fn = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud_fn) => *nud_fn,
        None => return Err(parser.unexpected()),
    };

    let mut left = nud_fn(parser)?;

    // While the next operator binds tighter than the current one, keep extending lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        let led_fn = match parser.get_led_lookup().get(&token_kind) {
            Some(led_fn) => *led_fn,
            None => return Err(parser.unexpected()),
        };
        left = led_fn(parser, left, next_bp)?;
    }

    Ok(left)
}

fn parse_number(parser: &Parser, digits: &str) -> Result<i32, Error> {
    digits.parse().map_err(|_| {
        Error::new(
            ErrorImpl::NumberParseError {
                token: digits.to_string(),
            },
            parser.get_position(),
        )
    })
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let line = parser.line();
    match parser.current_token_kind() {
        TokenKind::Number => {
            let value = parse_number(parser, &parser.current_token().value)?;
            parser.advance();
            Ok(Expr::Int(IntExpr { value, line }))
        }
        TokenKind::True | TokenKind::False => {
            let value = parser.advance().kind == TokenKind::True;
            Ok(Expr::Bool(BoolExpr { value, line }))
        }
        TokenKind::Null => {
            parser.advance();
            Ok(Expr::Null(NullExpr { line }))
        }
        _ => Err(parser.unexpected()),
    }
}

/// `- NUM`; there is no general unary minus.
pub fn parse_negative_number_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let line = parser.advance().line();
    if parser.current_token_kind() != TokenKind::Number {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected a number after `-`"),
            },
            parser.get_position(),
        ));
    }

    let digits = format!("-{}", parser.current_token().value);
    let value = parse_number(parser, &digits)?;
    parser.advance();
    Ok(Expr::Int(IntExpr { value, line }))
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let op = match operator_token.kind {
        TokenKind::Plus => BinaryOp::Plus,
        TokenKind::Dash => BinaryOp::Minus,
        TokenKind::Star => BinaryOp::Times,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        TokenKind::Equals => BinaryOp::Equal,
        TokenKind::LessEquals => BinaryOp::LessEqual,
        TokenKind::GreaterEquals => BinaryOp::GreaterEqual,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value.clone(),
                },
                operator_token.span.start.clone(),
            ))
        }
    };

    let right = parse_expr(parser, bp)?;

    Ok(Expr::binary(op, left, right, operator_token.line()))
}

/// `! exp`, binding tighter than `&&` and `||` only.
pub fn parse_not_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let line = parser.advance().line();
    let arg = parse_expr(parser, BindingPower::Logical)?;

    Ok(Expr::Not(NotExpr {
        arg: Box::new(arg),
        line,
    }))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// Comma separated arguments up to and including the closing parenthesis.
pub fn parse_args(parser: &mut Parser) -> Result<Vec<Expr>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut args = vec![];
    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            args.push(parse_expr(parser, BindingPower::Default)?);
            if !parser.eat(TokenKind::Comma) {
                break;
            }
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(args)
}

/// `ID`, `ID(args)` or `ID.ID(args)`.
pub fn parse_symbol_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    let line = token.line();

    match parser.current_token_kind() {
        TokenKind::OpenParen => {
            let args = parse_args(parser)?;
            Ok(Expr::call(&token.value, args, line))
        }
        TokenKind::Dot => {
            parser.advance();
            let method = parser.expect_detailed(TokenKind::Identifier, "expected method name")?;
            let args = parse_args(parser)?;
            Ok(Expr::class_call(&token.value, &method.value, args, line))
        }
        _ => Ok(Expr::id(&token.value, line)),
    }
}

/// `if exp then { exp } else { exp }`
pub fn parse_if_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let line = parser.advance().line();
    let cond = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::Then)?;
    parser.expect(TokenKind::OpenCurly)?;
    let then_branch = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseCurly)?;

    parser.expect_detailed(TokenKind::Else, "if expressions need an else branch")?;
    parser.expect(TokenKind::OpenCurly)?;
    let else_branch = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseCurly)?;

    Ok(Expr::If(IfExpr {
        cond: Box::new(cond),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
        line,
    }))
}

pub fn parse_print_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let line = parser.advance().line();
    parser.expect(TokenKind::OpenParen)?;
    let exp = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::Print(PrintExpr {
        exp: Box::new(exp),
        line,
    }))
}

/// `new ID(args)`
pub fn parse_new_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let line = parser.advance().line();
    let class = parser.expect_detailed(TokenKind::Identifier, "expected class name after new")?;
    let args = parse_args(parser)?;

    Ok(Expr::new_object(&class.value, args, line))
}
