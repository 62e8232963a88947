// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 页面选择器目录
//!
//! 每个字段对应一组按可靠性排序的CSS选择器，
//! 查找时从最具体的开始逐个回退。页面结构变化时只需调整此处。

/// CSS选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector(pub &'static str);

impl Selector {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// 搜索框
pub const SEARCH_BOX: &[Selector] = &[
    Selector("input#searchboxinput"),
    Selector("input[name=\"q\"]"),
    Selector("input[placeholder*=\"Search\"]"),
    Selector("input[placeholder*=\"Buscar\"]"),
    Selector("input[data-value=\"search\"]"),
];

/// 搜索提交按钮，回车失败时的回退
pub const SEARCH_BUTTON: &[Selector] = &[Selector("button[data-value=\"search\"]")];

/// 结果面板，回退后用于确认已回到结果视图
pub const RESULTS_VIEW: &[Selector] = &[
    Selector("div[role=\"feed\"]"),
    Selector("div[role=\"main\"]"),
    Selector("[aria-label*=\"Results\"]"),
    Selector("[aria-label*=\"Resultados\"]"),
];

/// 结果面板中的详情链接
pub const LISTING_LINKS: &[Selector] = &[
    Selector("div[role=\"main\"] a[href*=\"/maps/place/\"]"),
    Selector("[role=\"feed\"] a[href*=\"/maps/place/\"]"),
    Selector("a[href*=\"/maps/place/\"]"),
];

/// 商家名称
pub const NAME: &[Selector] = &[
    Selector("h1[data-attrid=\"title\"]"),
    Selector("h1[class*=\"DUwDvf\"]"),
    Selector("div[data-attrid=\"title\"] h1"),
    Selector("h1[class*=\"fontHeadlineLarge\"]"),
    Selector("h1"),
];

/// 电话文本容器
pub const PHONE_TEXT: &[Selector] = &[
    Selector("button[data-item-id*=\"phone\"]"),
    Selector("[data-value*=\"phone\"]"),
    Selector("button[aria-label*=\"Teléfono\"]"),
    Selector("button[aria-label*=\"Phone\"]"),
];

/// tel: 链接，文本容器未命中时的回退
pub const PHONE_TEL: &[Selector] = &[Selector("a[href^=\"tel:\"]")];

/// 网站链接
pub const WEBSITE: &[Selector] = &[
    Selector("a[data-item-id*=\"authority\"]"),
    Selector("a[data-value=\"website\"]"),
    Selector("a[aria-label*=\"sitio web\"]"),
    Selector("a[aria-label*=\"Website\"]"),
];

/// 地址
pub const ADDRESS: &[Selector] = &[
    Selector("button[data-item-id*=\"address\"]"),
    Selector("[data-value=\"address\"]"),
    Selector("[data-item-id=\"oloc\"] span"),
];

/// 评分，aria-label 携带评分与评论数
pub const RATING: &[Selector] = &[
    Selector("[role=\"img\"][aria-label*=\"estrellas\"]"),
    Selector("[role=\"img\"][aria-label*=\"stars\"]"),
    Selector("span[class*=\"rating\"]"),
];

/// 社交主页链接
pub const SOCIAL: &[Selector] = &[
    Selector("a[href*=\"instagram.com\"]"),
    Selector("a[aria-label*=\"Instagram\"]"),
];

/// 电子邮件链接
pub const EMAIL: &[Selector] = &[Selector("a[href^=\"mailto:\"]")];

/// 即时通讯链接
pub const MESSAGING: &[Selector] = &[
    Selector("a[href*=\"wa.me\"]"),
    Selector("a[href*=\"api.whatsapp.com\"]"),
    Selector("a[href*=\"whatsapp\"]"),
    Selector("[role=\"button\"] a[href*=\"wa.me\"]"),
];
