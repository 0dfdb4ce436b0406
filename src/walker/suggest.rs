//! Suggestion walk.

use std::sync::Arc;

use tracing::debug;

use crate::context::CommandContext;
use crate::sender::{Access, Sender};
use crate::tokenizer::TokenSequence;
use crate::tree::CommandNode;

use super::{Stop, Walker, argument_child};

impl<S: Sender> Walker<'_, S> {
    /// Raw completion candidates for the last token of `tokens`.
    ///
    /// `tokens` must come from suggestion-mode tokenization, so the last
    /// token is the one being completed. Candidates are not filtered against
    /// the partial token; that is the suggestion processor's job.
    pub fn suggest(&self, sender: Arc<S>, tokens: TokenSequence) -> Vec<String> {
        let mut context = CommandContext::for_suggestions(Arc::clone(&sender), tokens.clone());
        let partial = tokens.partial();
        let complete = tokens.complete();

        if complete.is_empty() {
            return self
                .tree
                .root()
                .literals()
                .filter(|node| self.access(node, &sender) == Access::Granted)
                .filter_map(CommandNode::as_literal)
                .flat_map(|literal| literal.names().map(str::to_string))
                .collect();
        }

        match self.descend(&mut context, complete, true) {
            Ok(Stop::Positional(node)) => {
                let mut out = Vec::new();
                if let Some(arg) = node.as_argument()
                    && arg.is_greedy()
                {
                    out.extend(arg.parser().suggestions(&context, partial));
                }
                self.collect(&context, node, partial, &sender, &mut out);
                out
            }
            Ok(Stop::Flags {
                awaiting: Some(flag),
                ..
            }) => flag
                .parser()
                .map(|parser| parser.suggestions(&context, partial))
                .unwrap_or_default(),
            Ok(Stop::Flags {
                node,
                awaiting: None,
            }) => self.unused_flags(&context, node),
            Err(rejection) => {
                debug!(%rejection, "no suggestions for rejected input");
                Vec::new()
            }
        }
    }

    /// Candidates offered at `node`, continuing through optional arguments.
    fn collect(
        &self,
        context: &CommandContext<S>,
        node: &CommandNode<S>,
        partial: &str,
        sender: &S,
        out: &mut Vec<String>,
    ) {
        for child in node.literals() {
            if self.access(child, sender) != Access::Granted {
                continue;
            }
            if let Some(literal) = child.as_literal() {
                out.extend(literal.names().map(str::to_string));
            }
        }

        if let Some((child, arg)) = argument_child(node)
            && self.access(child, sender) == Access::Granted
        {
            out.extend(arg.parser().suggestions(context, partial));
            if !arg.is_required() {
                self.collect(context, child, partial, sender, out);
            }
        }

        out.extend(self.unused_flags(context, node));
    }

    fn unused_flags(&self, context: &CommandContext<S>, node: &CommandNode<S>) -> Vec<String> {
        node.flags()
            .filter(|flag| !context.flags().contains(flag.name()))
            .map(|flag| self.flag_syntax().render_long(flag.name()))
            .collect()
    }
}
