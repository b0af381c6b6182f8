use crate::{Type, TypeEnv};

/// Render a type the way Java spells it in diagnostics (`java.lang.String`, `int[]`, `null`).
pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    match ty {
        Type::Void => "void".to_string(),
        Type::Null => "null".to_string(),
        Type::Primitive(prim) => prim.keyword().to_string(),
        Type::Class(id) => env
            .class(*id)
            .map(|def| def.name.clone())
            .unwrap_or_else(|| format!("<unknown class #{}>", id.to_raw())),
        Type::Array(component) => format!("{}[]", format_type(env, component)),
    }
}

/// `owner.name(p1, p2)`; constructors pass the owner's name as `name` and `None` as `owner`.
pub fn format_signature(env: &dyn TypeEnv, owner: Option<&Type>, name: &str, params: &[Type]) -> String {
    let params = params
        .iter()
        .map(|p| format_type(env, p))
        .collect::<Vec<_>>()
        .join(", ");
    match owner {
        Some(owner) => format!("{}.{name}({params})", format_type(env, owner)),
        None => format!("{name}({params})"),
    }
}
