use crate::mobject::error::Result;
use crate::mobject::math::{MathTypst, MathTypstOptions};
use crate::scene::{
    DEFAULT_MOBJECT_TO_EDGE_BUFFER, DOWN, Frame, LEFT, MED_SMALL_BUFF, ORIGIN, RIGHT, Stroke, UP,
    VMobject,
};
use crate::typst::PathRenderer;

#[derive(Debug, Clone, PartialEq)]
pub struct TitleOptions {
    pub include_underline: bool,
    /// Underline spans the text instead of the frame width minus two units.
    pub match_underline_width_to_text: bool,
    pub underline_buff: f32,
    pub frame: Frame,
    pub math: MathTypstOptions,
}

impl Default for TitleOptions {
    fn default() -> Self {
        Self {
            include_underline: true,
            match_underline_width_to_text: false,
            underline_buff: MED_SMALL_BUFF,
            frame: Frame::default(),
            math: MathTypstOptions::text_mode(),
        }
    }
}

/// Text pinned to the top of the frame, optionally underlined.
///
/// The underline is kept next to the text object rather than inside it, so the text's
/// parts are still exactly its fragments. [`Title::to_group`] puts them together.
#[derive(Debug, Clone)]
pub struct Title {
    math: MathTypst,
    underline: Option<VMobject>,
}

impl Title {
    pub fn new<S: AsRef<str>>(
        parts: &[S],
        options: TitleOptions,
        renderer: &dyn PathRenderer,
    ) -> Result<Self> {
        let mut math = MathTypst::new(parts, options.math.clone(), renderer)?;
        math.mobject_mut()
            .to_edge(UP, DEFAULT_MOBJECT_TO_EDGE_BUFFER, options.frame);

        let underline = options.include_underline.then(|| {
            let mut line = VMobject::line(LEFT, RIGHT, Stroke::default());
            line.name = "underline".to_string();
            line.next_to(math.mobject().bounds(), DOWN, options.underline_buff, ORIGIN);
            if options.match_underline_width_to_text {
                line.match_width(math.mobject());
            } else {
                line.set_width(options.frame.width - 2.0);
            }
            line
        });

        Ok(Self { math, underline })
    }

    pub fn math(&self) -> &MathTypst {
        &self.math
    }

    pub fn math_mut(&mut self) -> &mut MathTypst {
        &mut self.math
    }

    pub fn underline(&self) -> Option<&VMobject> {
        self.underline.as_ref()
    }

    /// Text and underline as one group, ready to be drawn or laid out together.
    pub fn to_group(&self) -> VMobject {
        let mut children = vec![self.math.mobject().clone()];
        children.extend(self.underline.clone());
        VMobject::group("Title", children)
    }
}
