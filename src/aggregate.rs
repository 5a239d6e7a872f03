//! Roll per-method records up into per-class totals.

use crate::model::{ClassNode, ClassStat, MethodStat};

/// Display/sort key of a class: `\ns::Name`, `@pkg::Name` or plain `Name`.
#[must_use]
pub fn qualified_name(class: &ClassNode) -> String {
    if !class.namespace.is_empty() {
        format!("\\{}::{}", class.namespace, class.name)
    } else if !class.package.is_empty() {
        format!("@{}::{}", class.package, class.name)
    } else {
        class.name.clone()
    }
}

/// Aggregate one class declared in `file`. Methods without executable lines
/// are dropped from both the counts and the method list.
#[must_use]
pub fn aggregate_class(file: &str, class: &ClassNode) -> ClassStat {
    let mut stat = ClassStat {
        qualified_name: qualified_name(class),
        file: file.to_string(),
        ..Default::default()
    };

    for method in class.methods.iter().filter(|m| m.executable_lines > 0) {
        let method = MethodStat::from(method);
        stat.method_count += 1;
        stat.statement_count += method.executable_lines;
        stat.statements_covered += method.executed_lines;
        if method.is_fully_covered() {
            stat.methods_covered += 1;
        }
        stat.methods.push(method);
    }

    stat
}
