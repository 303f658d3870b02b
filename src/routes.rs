use serde::Serialize;

/// A page of the web app and the template that renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct View {
    pub path: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub template: &'static str,
}

pub static VIEWS: [View; 4] = [
    View {
        path: "/",
        name: "home",
        title: "Astrologic",
        template: "home.html",
    },
    View {
        path: "/login",
        name: "login",
        title: "Sign in",
        template: "login.html",
    },
    View {
        path: "/chat",
        name: "chat",
        title: "Ask the stars",
        template: "chat.html",
    },
    View {
        path: "/payment",
        name: "payment",
        title: "Choose your plan",
        template: "payment.html",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_table() {
        let paths: Vec<_> = VIEWS.iter().map(|v| (v.path, v.name)).collect();
        assert_eq!(
            paths,
            vec![("/", "home"), ("/login", "login"), ("/chat", "chat"), ("/payment", "payment")]
        );
    }

    #[test]
    fn test_each_view_has_its_own_template() {
        for view in VIEWS.iter() {
            assert_eq!(view.template, format!("{}.html", view.name));
        }
    }
}
