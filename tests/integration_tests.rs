//! Integration tests for the XuLang compiler pipeline.

use std::io::Write;
use std::process::{Command, Stdio};
use xulang::prelude::*;
use xulang::utils::errors::DiagnosticCategory;

const IDADE: &str = r#"
: DECLARACOES
idade : INTEIRO
: PROGRAMA
LEIA idade
SE idade >= 18 ENTAO
    ESCREVA "Maior de idade"
FIM
"#;

fn compile(source: &str) -> CompileOutput {
    Compiler::default().compile(source, None)
}

fn diagnostics(source: &str) -> Vec<Diagnostic> {
    let output = compile(source);
    assert!(output.code().is_none(), "expected failure, got code");
    output.diagnostics().to_vec()
}

#[test]
fn test_idade_example() {
    let output = compile(IDADE);
    let code = output.code().expect("Failed to compile");

    assert!(code.contains("int idade;"));
    assert!(code.contains("scanf(\"%d\", &idade);"));
    assert!(code.contains("if (idade >= 18) {"));
    assert!(code.contains("printf(\"Maior de idade\\n\");"));
    assert!(!code.contains("else"));
    assert!(code.contains("#include <stdio.h>"));
    assert!(code.contains("int main(void) {"));
    assert!(code.trim_end().ends_with("return 0;\n}"));
}

#[test]
fn test_altura_example() {
    let source = ": DECLARACOES\nidade : INTEIRO\n: PROGRAMA\nESCREVA altura\n";
    let diags = diagnostics(source);

    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].category, DiagnosticCategory::Semantic);
    assert_eq!(diags[0].kind, "UndeclaredVariable");
    assert!(diags[0].message.contains("altura"));
    assert_eq!((diags[0].line, diags[0].column), (4, 9));
}

#[test]
fn test_redeclaration_and_other_errors() {
    let source = r#": DECLARACOES
x : INTEIRO
y : TEXTO
x : REAL
: PROGRAMA
y <- x
LEIA z
"#;
    let diags = diagnostics(source);
    let kinds: Vec<&str> = diags.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec!["Redeclaration", "TypeMismatch", "UndeclaredVariable"]);
    assert_eq!(diags[0].line, 4);
    assert!(diags[0].message.contains("'x'"));
}

#[test]
fn test_undeclared_in_every_position() {
    let source = ": DECLARACOES\nn : INTEIRO\n: PROGRAMA\na <- 1\nLEIA b\nESCREVA c\nn <- d * 2\nSE e > 0 ENTAO\nFIM";
    let diags = diagnostics(source);
    let names: Vec<_> = diags
        .iter()
        .map(|d| {
            assert_eq!(d.kind, "UndeclaredVariable");
            d.line
        })
        .collect();
    assert_eq!(names, vec![4, 5, 6, 7, 8]);
}

#[test]
fn test_text_into_integer_rejected() {
    let diags = diagnostics(": DECLARACOES\nn : INTEIRO\nt : TEXTO\n: PROGRAMA\nLEIA t\nn <- t");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, "TypeMismatch");
    assert_eq!(diags[0].line, 6);
}

#[test]
fn test_integer_literal_into_real_accepted() {
    let output = compile(": DECLARACOES\naltura : REAL\n: PROGRAMA\naltura <- 2\nESCREVA altura");
    let code = output.code().expect("Failed to compile");
    assert!(code.contains("double altura;"));
    assert!(code.contains("altura = 2;"));
    assert!(code.contains("printf(\"%f\\n\", altura);"));
}

#[test]
fn test_if_else_shapes() {
    let without = parse(": DECLARACOES\n: PROGRAMA\nSE 1 > 0 ENTAO\nESCREVA \"a\"\nFIM").expect("Failed to parse");
    let with = parse(": DECLARACOES\n: PROGRAMA\nSE 1 > 0 ENTAO\nESCREVA \"a\"\nSENAO\nESCREVA \"b\"\nFIM")
        .expect("Failed to parse");

    assert!(matches!(&without.statements[0].kind, StmtKind::If { else_branch: None, .. }));
    assert!(matches!(&with.statements[0].kind, StmtKind::If { else_branch: Some(b), .. } if b.len() == 1));
}

#[test]
fn test_missing_fim_is_syntax_error() {
    let diags = diagnostics(": DECLARACOES\nx : INTEIRO\n: PROGRAMA\nSE x > 0 ENTAO\nESCREVA x\n");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].category, DiagnosticCategory::Syntax);
    assert_eq!(diags[0].kind, "MissingTerminator");
    assert!(diags[0].message.contains("FIM"));
    assert!(diags[0].message.contains("line 4"));
}

#[test]
fn test_lexical_error_position() {
    let diags = diagnostics(": DECLARACOES\nx : INTEIRO\n: PROGRAMA\nx <- 1 & 2");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].category, DiagnosticCategory::Lexical);
    assert_eq!(diags[0].kind, "InvalidCharacter");
    assert_eq!((diags[0].line, diags[0].column), (4, 8));
}

#[test]
fn test_deterministic_output() {
    let source = r#": DECLARACOES
contador : INTEIRO
media : REAL
nome : TEXTO
: PROGRAMA
LEIA nome
contador <- 0
media <- 0
ENQUANTO contador < 10
    media <- media + contador / 2.0
    contador <- contador + 1
FIM
ESCREVA nome
ESCREVA media
"#;
    let first = compile(source);
    let second = compile(source);
    assert!(first.is_success());
    assert_eq!(first, second);
}

#[test]
fn test_concurrent_compilations() {
    let compiler = Compiler::default();
    let expected = compiler.compile(IDADE, Some("idade.xu"));

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let compiler = &compiler;
                s.spawn(move || {
                    if i % 2 == 0 {
                        compiler.compile(IDADE, Some("idade.xu"))
                    } else {
                        compiler.compile(": DECLARACOES\n: PROGRAMA\nLEIA nada", None)
                    }
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let output = handle.join().expect("compile thread panicked");
            if i % 2 == 0 {
                assert_eq!(output, expected);
            } else {
                assert_eq!(output.diagnostics().len(), 1);
            }
        }
    });
}

#[test]
fn test_json_contract() {
    let success: serde_json::Value =
        serde_json::from_str(&compile(IDADE).to_json().expect("Failed to serialize")).unwrap();
    assert!(success["code"].as_str().unwrap().contains("int idade;"));
    assert!(success.get("diagnostics").is_none());

    let failure = compile(": DECLARACOES\n: PROGRAMA\nESCREVA altura");
    let failure: serde_json::Value = serde_json::from_str(&failure.to_json().unwrap()).unwrap();
    assert!(failure.get("code").is_none());
    let diag = &failure["diagnostics"][0];
    assert_eq!(diag["category"], "Semantic");
    assert_eq!(diag["kind"], "UndeclaredVariable");
    assert_eq!(diag["line"], 3);
    assert_eq!(diag["column"], 9);
    assert!(diag["message"].as_str().unwrap().contains("altura"));
}

const MEDIA: &str = r#"
# calcula a media de notas
: DECLARACOES
n : INTEIRO
i : INTEIRO
nota : REAL
soma : REAL
aprovado : LOGICO
: PROGRAMA
LEIA n
i <- 0
soma <- 0
ENQUANTO i < n
    LEIA nota
    soma <- soma + nota
    i <- i + 1
FIM
SE n > 0 E (soma / n >= 7.0 OU n == 1) ENTAO
    ESCREVA "Aprovado com 100%"
SENAO
    INICIO
        LEIA aprovado
        ESCREVA aprovado
    FIM
FIM
"#;

#[test]
fn test_full_program_translation() {
    let output = Compiler::default().compile(MEDIA, Some("media.xu"));
    let code = output.code().expect("Failed to compile");

    let expected = r#"/* Generated by xuc from media.xu */
#include <stdio.h>
#include <stdlib.h>
#include <string.h>

int main(void) {
    int n;
    int i;
    double nota;
    double soma;
    int aprovado;

    scanf("%d", &n);
    i = 0;
    soma = 0;
    while (i < n) {
        scanf("%lf", &nota);
        soma = soma + nota;
        i = i + 1;
    }
    if (n > 0 && (soma / n >= 7.0 || n == 1)) {
        printf("Aprovado com 100%%\n");
    } else {
        {
            scanf("%d", &aprovado);
            printf("%d\n", aprovado);
        }
    }
    return 0;
}
"#;
    assert_eq!(code, expected);
}

#[test]
fn test_render_for_terminal() {
    let source = ": DECLARACOES\nidade : INTEIRO\n: PROGRAMA\nESCREVA altura\n";
    let diags = diagnostics(source);
    let rendered = diags[0].render(&SourceMap::new(source), Some("prog.xu"));
    assert!(rendered.starts_with("prog.xu:4:9: semantic error [UndeclaredVariable]"));
    assert!(rendered.ends_with("|         ^"));
}

#[test]
fn test_invalid_options_rejected() {
    let options = CompileOptions { text_buffer_size: 0, ..Default::default() };
    assert!(Compiler::new(options).is_err());
}

const RESERVED_NAMES: &str = r#"
: DECLARACOES
int : INTEIRO
linux : INTEIRO
unix : REAL
P_tmpdir : TEXTO
bool : LOGICO
main : INTEIRO
printf : TEXTO
: PROGRAMA
LEIA int
LEIA linux
LEIA unix
LEIA P_tmpdir
LEIA bool
main <- int + linux
printf <- P_tmpdir
printf <- printf
ESCREVA main
ESCREVA unix
ESCREVA bool
ESCREVA printf
ESCREVA "Tem certeza??! o que??/ ok, 100% C:\temp"
"#;

fn has_c_compiler() -> bool {
    Command::new("cc")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Run `cc -fsyntax-only` over `code`, returning the compiler's complaints.
fn check_c_syntax(code: &str, flags: &[&str]) -> Result<(), String> {
    let mut child = Command::new("cc")
        .args(flags)
        .args(["-fsyntax-only", "-x", "c", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| e.to_string())?;
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(code.as_bytes())
        .map_err(|e| e.to_string())?;
    let output = child.wait_with_output().map_err(|e| e.to_string())?;
    if output.status.success() {
        Ok(())
    } else {
        Err(String::from_utf8_lossy(&output.stderr).into_owned())
    }
}

#[test]
fn test_generated_c_compiles() {
    if !has_c_compiler() {
        eprintln!("skipping: no 'cc' on PATH");
        return;
    }

    let programs = [("idade.xu", IDADE), ("media.xu", MEDIA), ("reservados.xu", RESERVED_NAMES)];
    for (name, source) in programs {
        let output = Compiler::default().compile(source, Some(name));
        let code = output.code().unwrap_or_else(|| panic!("{} failed: {:?}", name, output.diagnostics()));

        // strict standard mode: trigraphs are live
        if let Err(stderr) = check_c_syntax(code, &["-std=c99", "-pedantic", "-Wall", "-Werror"]) {
            panic!("{} does not compile as C99:\n{}\n{}", name, stderr, code);
        }
        // default mode: `linux`, `unix` and friends are predefined
        if let Err(stderr) = check_c_syntax(code, &["-Wall", "-Werror"]) {
            panic!("{} does not compile in the default mode:\n{}\n{}", name, stderr, code);
        }
    }
}

#[test]
fn test_reserved_names_translation() {
    let output = compile(RESERVED_NAMES);
    let code = output.code().expect("Failed to compile");
    assert!(code.contains("int xu_linux;"));
    assert!(code.contains("double xu_unix;"));
    assert!(code.contains("char xu_P_tmpdir[256];"));
    assert!(code.contains("int xu_bool;"));
    assert!(code.contains("xu_main = xu_int + xu_linux;"));
    assert!(code.contains("strcpy(xu_printf, xu_P_tmpdir);"));
    assert!(code.contains("memmove(xu_printf, xu_printf, strlen(xu_printf) + 1);"));
    assert!(code.contains(r#"printf("Tem certeza\?\?! o que\?\?/ ok, 100%% C:\\temp\n");"#));
}
