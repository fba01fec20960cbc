use crate::error::Result;
use crate::profile::NormalizeConfig;
use crate::types::{NormalizeRule, ReplaceReason, RewriteLog};
use regex::Regex;

/// Drops the pre-theme dark-mode plumbing once colors come from the theme.
#[derive(Debug, Clone)]
pub struct StructuralNormalizer {
    rules: Vec<(NormalizeRule, Regex, String)>,
}

impl StructuralNormalizer {
    pub fn new(config: &NormalizeConfig, qualifier: &str) -> Result<Self> {
        let flag = regex::escape(&config.flag_field);
        let method = regex::escape(&config.toggle_method);
        let param = regex::escape(&config.callback_param);
        let q = regex::escape(qualifier);

        let mut rules = vec![
            (
                NormalizeRule::FlagField,
                Regex::new(&format!(r"\s*\bbool\s+{flag}\s*=\s*(?:true|false)\s*;[ \t]*\n"))?,
                "\n".to_string(),
            ),
            (
                NormalizeRule::ToggleCallback,
                Regex::new(&format!(
                    r"\s*\bvoid\s+{method}\s*\(\s*bool\s+\w+\s*\)\s*(?:=>\s*setState\(\s*\(\)\s*=>\s*{flag}\s*=\s*\w+\s*\)\s*;|\{{\s*setState\(\s*\(\)\s*=>\s*{flag}\s*=\s*\w+\s*\)\s*;\s*\}})[ \t]*\n"
                ))?,
                "\n".to_string(),
            ),
        ];

        for ctor in &config.constructors {
            let name = regex::escape(ctor);
            let replacement = if config.qualify_rewritten {
                format!("{qualifier} {ctor}()")
            } else {
                format!("{ctor}()")
            };
            rules.push((
                NormalizeRule::ConstructorCall,
                Regex::new(&format!(
                    r"(?:\b{q}\s+)?\b{name}\s*\(\s*{flag}\s*:\s*[\w.]+\s*,\s*{param}\s*:\s*[\w.]+\s*,?\s*\)"
                ))?,
                replacement,
            ));
        }

        Ok(Self { rules })
    }

    pub fn apply(&self, text: &str, log: &mut RewriteLog) -> String {
        let mut current = text.to_string();

        for (rule, regex, replacement) in &self.rules {
            let mut out = String::with_capacity(current.len());
            let mut last = 0;
            let mut count = 0;

            for m in regex.find_iter(&current) {
                out.push_str(&current[last..m.start()]);
                out.push_str(replacement);
                log.record(
                    m.start(),
                    m.as_str(),
                    replacement.as_str(),
                    ReplaceReason::Normalized { rule: *rule },
                );
                last = m.end();
                count += 1;
            }

            if count > 0 {
                out.push_str(&current[last..]);
                log::debug!("{rule:?} normalized {count} site(s)");
                current = out;
            }
        }

        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn normalizer() -> StructuralNormalizer {
        StructuralNormalizer::new(
            &NormalizeConfig {
                flag_field: "isDarkMode".to_string(),
                toggle_method: "_toggleTheme".to_string(),
                callback_param: "onThemeChanged".to_string(),
                constructors: vec!["ProfileScreen".to_string()],
                qualify_rewritten: true,
            },
            "const",
        )
        .expect("normalizer")
    }

    #[test]
    fn removes_flag_field_and_toggle() {
        let input = "class _S extends State<S> {\n  int tab = 0;\n  bool isDarkMode = false;\n  void _toggleTheme(bool v) => setState(() => isDarkMode = v);\n\n  Widget build(BuildContext context) {}\n}\n";
        let out = normalizer().apply(input, &mut RewriteLog::default());
        assert_eq!(
            out,
            "class _S extends State<S> {\n  int tab = 0;\n\n  Widget build(BuildContext context) {}\n}\n"
        );
    }

    #[test]
    fn removes_block_bodied_toggle() {
        let input = "  int a = 1;\n  void _toggleTheme(bool value) {\n    setState(() => isDarkMode = value);\n  }\n  int b = 2;\n";
        let out = normalizer().apply(input, &mut RewriteLog::default());
        assert_eq!(out, "  int a = 1;\n  int b = 2;\n");
    }

    #[test]
    fn rewrites_single_line_constructor_call() {
        let input = "pages: [ProfileScreen(isDarkMode: isDarkMode, onThemeChanged: _toggleTheme)],";
        let mut log = RewriteLog::default();
        let out = normalizer().apply(input, &mut log);
        assert_eq!(out, "pages: [const ProfileScreen()],");
        assert_eq!(
            log.events[0].reason,
            ReplaceReason::Normalized {
                rule: NormalizeRule::ConstructorCall
            }
        );
    }

    #[test]
    fn rewrites_multi_line_constructor_call_with_trailing_comma() {
        let input = "  return ProfileScreen(\n    isDarkMode: isDarkMode,\n    onThemeChanged: _toggleTheme,\n  );";
        let out = normalizer().apply(input, &mut RewriteLog::default());
        assert_eq!(out, "  return const ProfileScreen();");
    }

    #[test]
    fn other_shapes_are_left_alone() {
        let input = "ProfileScreen(user: u)\nbool isDarkModeEnabled = true;\nconst ProfileScreen()";
        let out = normalizer().apply(input, &mut RewriteLog::default());
        assert_eq!(out, input);
    }
}
