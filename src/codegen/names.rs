//! Mapping from XuLang identifiers to C identifiers.
//!
//! Most names pass through unchanged. A name that is a C keyword, a name
//! the generated code itself needs (`main`, `printf`, `scanf`, ...), a
//! macro from the included headers, or an identifier reserved to the C
//! implementation is renamed to `xu_<name>`, with `_` appended until the
//! result collides with nothing else in the program.

use crate::frontend::symbols::SymbolTable;
use log::debug;
use std::collections::{HashMap, HashSet};

/// C keywords up to C23, plus the GNU ones compilers accept by default.
const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "alignas", "alignof", "bool", "constexpr",
    "false", "nullptr", "static_assert", "thread_local", "true", "typeof", "typeof_unqual",
    "asm",
];

/// Names used by the generated translation unit, object-like macros from
/// its headers, and macros the compiler predefines outside strict modes.
const RUNTIME_NAMES: &[&str] = &[
    "main", "printf", "scanf", "strcpy", "strlen", "memmove", "stdin", "stdout", "stderr",
    "EOF", "NULL", "FILE", "BUFSIZ", "EXIT_SUCCESS", "EXIT_FAILURE", "RAND_MAX", "MB_CUR_MAX",
    "SEEK_SET", "SEEK_CUR", "SEEK_END", "FILENAME_MAX", "FOPEN_MAX", "TMP_MAX", "L_tmpnam",
    "P_tmpdir", "L_ctermid", "L_cuserid", "WNOHANG", "WUNTRACED", "WSTOPPED", "WEXITED",
    "WCONTINUED", "WNOWAIT", "size_t", "errno", "assert", "linux", "unix", "i386", "sun",
];

/// Check if `name` cannot be used as-is in the generated C.
pub fn is_reserved(name: &str) -> bool {
    if C_KEYWORDS.contains(&name) || RUNTIME_NAMES.contains(&name) {
        return true;
    }
    // _Bool, __x and friends belong to the implementation
    let mut chars = name.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('_'), Some('_')) | (Some('_'), Some('A'..='Z'))
    )
}

/// The C name of every declared variable.
#[derive(Debug, Clone, Default)]
pub struct CNames {
    names: HashMap<String, String>,
}

impl CNames {
    /// Assign C names to the symbols of `table`, in declaration order.
    pub fn new(table: &SymbolTable) -> Self {
        let source_names: HashSet<&str> = table.iter().map(|s| s.name.as_str()).collect();
        let mut taken: HashSet<String> = HashSet::new();
        let mut renamed = Vec::new();

        for symbol in table.iter() {
            if is_reserved(&symbol.name) {
                renamed.push(symbol.name.as_str());
            } else {
                taken.insert(symbol.name.clone());
            }
        }

        let mut names: HashMap<String, String> =
            taken.iter().map(|name| (name.clone(), name.clone())).collect();

        for name in renamed {
            let mut candidate = format!("xu_{}", name);
            while taken.contains(&candidate) || source_names.contains(candidate.as_str()) {
                candidate.push('_');
            }
            debug!("renaming '{}' to '{}' in the generated C", name, candidate);
            taken.insert(candidate.clone());
            names.insert(name.to_string(), candidate);
        }

        Self { names }
    }

    /// C name of a declared variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }
}
