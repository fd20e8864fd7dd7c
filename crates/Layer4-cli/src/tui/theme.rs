//! Theme - 브라우저 화면 색상과 스타일

use ratatui::style::{Color, Modifier, Style};

/// 화면 테마
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// 전경색 (기본 텍스트)
    pub fg: Color,
    /// 보조 정보
    pub muted: Color,
    /// 강조색
    pub accent: Color,
    /// 허용
    pub granted: Color,
    /// 경고 (저장 안 된 변경)
    pub warning: Color,
    /// 에러
    pub error: Color,
    /// 보더
    pub border: Color,
    /// 선택된 행 배경
    pub selection_bg: Color,
    /// 선택된 행 전경
    pub selection_fg: Color,
}

impl Theme {
    /// 다크 테마 (기본)
    pub fn dark() -> Self {
        Self {
            fg: Color::Rgb(220, 220, 224),        // #dcdce0
            muted: Color::Rgb(128, 128, 140),     // #80808c
            accent: Color::Rgb(120, 180, 255),    // #78b4ff
            granted: Color::Rgb(80, 200, 120),    // #50c878
            warning: Color::Rgb(255, 200, 80),    // #ffc850
            error: Color::Rgb(255, 100, 100),     // #ff6464
            border: Color::Rgb(60, 60, 70),       // #3c3c46
            selection_bg: Color::Rgb(50, 80, 120), // #325078
            selection_fg: Color::Rgb(255, 255, 255),
        }
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn header(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .fg(self.selection_fg)
    }

    pub fn granted(&self) -> Style {
        Style::default().fg(self.granted)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// 단축키 힌트
    pub fn keybind(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// 단축키 설명
    pub fn keybind_desc(&self) -> Style {
        Style::default().fg(self.muted)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
