//! Syntax strings and arity.

use crate::tokenizer::FlagSyntax;

use super::command::Arity;
use super::component::PathComponent;

/// Renders `literal <required> [optional] [--flag] [--valued <valued>]`.
pub fn render<S>(components: &[PathComponent<S>], flags: &FlagSyntax) -> String {
    components
        .iter()
        .map(|component| match component {
            PathComponent::Literal(literal) => literal.name().to_string(),
            PathComponent::Argument(arg) if arg.is_required() => format!("<{}>", arg.name()),
            PathComponent::Argument(arg) => format!("[{}]", arg.name()),
            PathComponent::Flag(flag) if flag.is_valued() => {
                format!("[{} <{}>]", flags.render_long(flag.name()), flag.name())
            }
            PathComponent::Flag(flag) => format!("[{}]", flags.render_long(flag.name())),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Counts positional components.
pub fn arity<S>(components: &[PathComponent<S>]) -> Arity {
    let mut min = 0;
    let mut max = Some(0);
    for component in components {
        match component {
            PathComponent::Literal(_) => min += 1,
            PathComponent::Argument(arg) => {
                if arg.is_required() {
                    min += 1;
                }
                if arg.is_greedy() {
                    max = None;
                }
            }
            PathComponent::Flag(_) => continue,
        }
        max = max.map(|m| m + 1);
    }
    Arity { min, max }
}
