//! Page templates for the web UI. Unlike the prompts these are
//! rendered with Handlebars' default HTML escaping since every value
//! shown comes from user input.

use std::fmt;

use handlebars::{Handlebars, RenderError};
use serde::Serialize;
use serde_json::json;

#[derive(Clone, Copy, Debug)]
pub enum Page {
    Layout,
    Loading,
    Calendar,
    BookingForm,
    BookingSuccess,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="ar" dir="rtl">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{title}}</title>
<style>
body { font-family: sans-serif; background: #f9fafb; color: #1f2937; margin: 0; padding: 1.5rem; }
main { max-width: 56rem; margin: 0 auto; }
header, footer { text-align: center; }
h1 { color: #0f766e; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(15rem, 1fr)); gap: 1.5rem; }
.card { background: #fff; border-radius: .75rem; box-shadow: 0 1px 3px #0002; padding: 1.25rem; border-top: 4px solid #e5e7eb; }
.card.booked { border-top-color: #14b8a6; }
.muted { color: #6b7280; }
.error { color: #ef4444; }
.banner { background: #fee2e2; color: #991b1b; padding: .75rem; border-radius: .5rem; margin-bottom: 1rem; text-align: center; }
.button { display: inline-block; background: #0d9488; color: #fff; padding: .5rem 1rem; border-radius: .5rem; border: 0; text-decoration: none; cursor: pointer; }
.button.secondary { background: #fff; color: #0f766e; border: 1px solid #0d9488; }
.result { background: #f3f4f6; border-radius: .5rem; padding: 1rem; position: relative; }
.result-text { white-space: pre-wrap; }
.copy { position: absolute; top: .5rem; left: .5rem; font-size: .75rem; padding: .25rem .5rem; }
</style>
</head>
<body>
<main>
{{{body}}}
</main>
</body>
</html>
"#;

const LOADING: &str = r#"<p class="muted" style="text-align:center;margin-top:30vh">{{message}}</p>
<script>
new EventSource("/api/bookings/stream").addEventListener("snapshot", (e) => {
  if (JSON.parse(e.data).status !== "loading") window.location.reload();
});
</script>
"#;

const CALENDAR: &str = r#"<header>
<h1>جدول الدورية الشهرية للأسرة</h1>
<p class="muted">عام {{year}} هـ</p>
<p class="muted">"مَنْ أَحَبَّ أَنْ يُبْسَطَ لَهُ فِي رِزْقِهِ، وَيُنْسَأَ لَهُ فِي أَثَرِهِ، فَلْيَصِلْ رَحِمَهُ"</p>
</header>
{{#if banner}}<div class="banner">{{banner}}</div>{{/if}}
<section class="grid">
{{#each cards}}
<article class="card{{#if booked}} booked{{/if}}">
<h2>{{name}}</h2>
{{#if booked}}
<p><strong>المضيف:</strong> {{host}}</p>
<p><strong>المكان:</strong> {{location}}</p>
<p><strong>اليوم:</strong> يوم {{day}} نهاية الشهر</p>
{{else}}
<p class="muted">لم يُحجز بعد</p>
<a class="button" href="/book/{{path}}">حجز الدورية</a>
{{/if}}
</article>
{{/each}}
</section>
<footer><p class="muted">نسأل الله أن يديم علينا الوصل والمحبة.</p></footer>
<script>
let seen = 0;
new EventSource("/api/bookings/stream").addEventListener("snapshot", () => {
  if (++seen > 1) window.location.reload();
});
</script>
"#;

const BOOKING_FORM: &str = r#"<h1>حجز دورية شهر {{month}}</h1>
<p class="muted">الرجاء إكمال البيانات التالية لتأكيد الحجز.</p>
<form method="post" action="/book/{{path}}">
<p>
<label for="host">اختر المضيف</label><br>
<select id="host" name="host">
{{#each hosts}}<option value="{{value}}"{{#if selected}} selected{{/if}}>{{value}}</option>{{/each}}
</select>
</p>
<p>
<label for="location">اختر المكان</label><br>
<select id="location" name="location">
{{#each locations}}<option value="{{value}}"{{#if selected}} selected{{/if}}>{{value}}</option>{{/each}}
</select>
</p>
<p>اختر اليوم المناسب<br>
{{#each days}}<label><input type="radio" name="day" value="{{value}}"{{#if checked}} checked{{/if}}> {{label}}</label> {{/each}}
</p>
{{#if error}}<p class="error">{{error}}</p>{{/if}}
<p>
<button class="button" type="submit">تأكيد الحجز</button>
<a class="button secondary" href="/">إلغاء</a>
</p>
</form>
"#;

const BOOKING_SUCCESS: &str = r#"<header>
<h1>تم الحجز بنجاح!</h1>
<p>دورية شهر <strong>{{month}}</strong> أصبحت باسم <strong>{{host}}</strong>.</p>
</header>
<section class="card">
<p><strong>ماذا تريد أن تفعل الآن؟</strong></p>
<form method="post" action="/assistant/{{path}}/ideas" onsubmit="busy(this)" style="display:inline">
<button class="button secondary" type="submit"{{#if busy}} disabled{{/if}}>✨ اقتراح أفكار للجمعة</button>
</form>
<form method="post" action="/assistant/{{path}}/invitation" onsubmit="busy(this)" style="display:inline">
<button class="button secondary" type="submit"{{#if busy}} disabled{{/if}}>✨ إنشاء رسالة دعوة</button>
</form>
<p id="loading" class="muted"{{#unless busy}} hidden{{/unless}}>جاري الإبداع...</p>
{{#if error}}<p class="error">{{error}}</p>{{/if}}
{{#if result}}<div class="result">
<button class="button secondary copy" type="button" onclick="copyResult(this)">نسخ</button>
<div id="result-text" class="result-text">{{result}}</div>
</div>{{/if}}
</section>
<p style="text-align:center"><a class="button secondary" href="/">إغلاق</a></p>
<script>
function busy(form) {
  document.querySelectorAll("button").forEach((b) => (b.disabled = true));
  document.getElementById("loading").hidden = false;
}
function copyResult(button) {
  navigator.clipboard.writeText(document.getElementById("result-text").innerText).then(() => {
    button.textContent = "تم النسخ!";
    setTimeout(() => (button.textContent = "نسخ"), 2000);
  });
}
</script>
"#;

pub fn templates<'a>() -> Handlebars<'a> {
    let mut registry = Handlebars::new();
    for (page, source) in [
        (Page::Layout, LAYOUT),
        (Page::Loading, LOADING),
        (Page::Calendar, CALENDAR),
        (Page::BookingForm, BOOKING_FORM),
        (Page::BookingSuccess, BOOKING_SUCCESS),
    ] {
        registry
            .register_template_string(&page.to_string(), source)
            .expect("Failed to register template");
    }
    registry
}

/// Render `page` wrapped in the shared layout.
pub fn render_page<T: Serialize>(title: &str, page: Page, data: &T) -> Result<String, RenderError> {
    let registry = templates();
    let body = registry.render(&page.to_string(), data)?;
    registry.render(&Page::Layout.to_string(), &json!({ "title": title, "body": body }))
}
