//! Test utilities for classmap-core

use crate::analyzer::Analyzer;
use crate::model::*;
use crate::usage::MemorySources;

/// Reference id the way the documentation generator spells it.
pub fn reference(qualified: &str) -> String {
    format!("class{}", qualified.replace("::", "_1_1"))
}

pub fn class(qualified: &str) -> ClassDecl {
    ClassDecl {
        id: reference(qualified),
        qualified_name: qualified.to_string(),
        source_file: format!("{}.h", qualified.rsplit("::").next().unwrap_or(qualified).to_lowercase()),
        ..Default::default()
    }
}

pub fn interface(qualified: &str) -> ClassDecl {
    ClassDecl {
        is_abstract: true,
        ..class(qualified)
    }
}

pub fn base(target: &str) -> InheritanceDecl {
    InheritanceDecl {
        target_type_name: target.to_string(),
        protection: Protection::Public,
        is_virtual: false,
    }
}

pub fn member(name: &str, type_name: &str) -> Member {
    Member {
        name: name.to_string(),
        type_name: type_name.to_string(),
        protection: Protection::Private,
        brief_description: String::new(),
    }
}

/// Public, non-virtual method with no body.
pub fn method(owner: &str, name: &str) -> Method {
    Method {
        id: format!("{}_1{}", reference(owner), name.trim_start_matches('~')),
        name: name.to_string(),
        return_type: "void".to_string(),
        protection: Protection::Public,
        ..Default::default()
    }
}

pub fn param(type_name: &str, name: &str) -> Param {
    Param {
        type_name: type_name.to_string(),
        name: name.to_string(),
    }
}

pub fn with_body(mut method: Method, file: &str, begin: u32, end: u32) -> Method {
    method.body_file = file.to_string();
    method.body_begin_line = Some(begin);
    method.body_end_line = Some(end);
    method
}

pub fn code_line(number: u32, text: &str) -> SourceLine {
    SourceLine {
        number,
        spans: vec![Span {
            text: text.to_string(),
            is_comment: false,
        }],
    }
}

pub fn commented_line(number: u32, code: &str, comment: &str) -> SourceLine {
    SourceLine {
        number,
        spans: vec![
            Span {
                text: code.to_string(),
                is_comment: false,
            },
            Span {
                text: comment.to_string(),
                is_comment: true,
            },
        ],
    }
}

/// Listing whose lines are numbered from `first`.
pub fn listing(file: &str, first: u32, lines: &[&str]) -> SourceListing {
    SourceListing {
        file: file.to_string(),
        lines: lines
            .iter()
            .zip(first..)
            .map(|(text, number)| code_line(number, text))
            .collect(),
    }
}

pub fn declarations(namespaces: &[&str], classes: Vec<ClassDecl>) -> Declarations {
    Declarations {
        namespaces: namespaces.iter().map(|n| n.to_string()).collect(),
        classes,
    }
}

/// Symbol table built and resolved, before usage detection.
pub fn resolved(declarations: Declarations) -> Analyzer {
    let mut analyzer = Analyzer::new(declarations);
    analyzer.resolve();
    analyzer
}

/// Small geometry model touching every analysis stage:
///
/// - `Geo::Shape` interface with a virtual `area() const`
/// - `Geo::Circle : Shape`, members `m_radius` and `m_center` (`Detail::Point`)
/// - `Geo::Detail::Point`
/// - `Geo::Canvas` holding `std::vector<Shape*>`, with `draw(const Circle&)`
/// - an `Unused` namespace
pub fn geometry() -> (Declarations, MemorySources) {
    let mut area = method("Geo::Shape", "area");
    area.return_type = "double".to_string();
    area.is_virtual = true;
    area.is_const = true;
    let mut shape = interface("Geo::Shape");
    shape.methods = vec![area];

    let mut circle_area = with_body(method("Geo::Circle", "area"), "circle.cpp", 3, 5);
    circle_area.return_type = "double".to_string();
    circle_area.is_virtual = true;
    circle_area.is_const = true;
    circle_area.has_override_keyword = true;
    let mut ctor = method("Geo::Circle", "Circle");
    ctor.return_type = String::new();
    let mut scale = with_body(method("Geo::Circle", "scale"), "circle.cpp", 7, 10);
    scale.params = vec![param("double", "f")];

    let mut circle = class("Geo::Circle");
    circle.inheritance = vec![base("Shape")];
    circle.members = vec![member("m_radius", "double"), member("m_center", "Detail::Point")];
    circle.methods = vec![circle_area, ctor, scale];

    let mut point = class("Geo::Detail::Point");
    point.kind = DeclKind::Struct;
    point.members = vec![member("x", "double"), member("y", "double")];

    let mut draw = with_body(method("Geo::Canvas", "draw"), "canvas.cpp", 1, 4);
    draw.params = vec![param("const Circle&", "c")];
    let mut canvas = class("Geo::Canvas");
    canvas.members = vec![member("m_shapes", "std::vector<Shape*>")];
    canvas.methods = vec![draw];

    let decls = declarations(
        &["Geo", "Geo::Detail", "Unused"],
        vec![shape, circle, point, canvas],
    );

    let circle_cpp = SourceListing {
        file: "circle.cpp".to_string(),
        lines: vec![
            code_line(3, "double Circle::area() const {"),
            commented_line(4, "    return 3.14 * m_radius * m_radius; ", "// area"),
            code_line(5, "}"),
            code_line(7, "void Circle::scale(double f) {"),
            code_line(8, "    m_radius *= f;"),
            code_line(9, "    Detail::Point p;"),
            code_line(10, "}"),
        ],
    };
    let canvas_cpp = listing(
        "canvas.cpp",
        1,
        &[
            "void Canvas::draw(const Circle& c) {",
            "    log(\"Circle drawn\");",
            "    Circle copy = c;",
            "}",
        ],
    );

    (decls, MemorySources(vec![circle_cpp, canvas_cpp]))
}
