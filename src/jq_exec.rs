//! jq pre-filtering for CLI inputs, via jaq.

use anyhow::{anyhow, Context, Result};
use jaq_core::{load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Compile `filter_src` and run it over `input`, returning every value the
/// filter produces.
pub fn apply_filter(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader.load(&arena, program).map_err(|errs| {
        let lines: Vec<String> = errs
            .into_iter()
            .map(|(file, err)| format!("jq parse error in `{}`: {err:?}", file.code))
            .collect();
        anyhow!(lines.join("\n"))
    })?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| {
            let mut lines: Vec<String> = Vec::new();
            for (file, list) in errs {
                for (name, undefined) in list {
                    lines.push(format!(
                        "jq: `{name}` is undefined ({undefined:?}) in `{}`",
                        file.code
                    ));
                }
            }
            anyhow!(lines.join("\n"))
        })?;

    let inputs = RcIter::new(core::iter::empty());
    let mut out = Vec::new();
    for item in filter.run((Ctx::new([], &inputs), Val::from(input.clone()))) {
        let val = item.map_err(|e| anyhow!("jq runtime error: {e:?}"))?;
        // Val displays as JSON text; round-trip it back into a Value
        let text = val.to_string();
        out.push(
            serde_json::from_str(&text)
                .with_context(|| format!("jq produced non-JSON output: {text}"))?,
        );
    }
    Ok(out)
}
